use tickwatch_store::Store;

use crate::cli::RegisterUserArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &RegisterUserArgs, store: &Store) -> Result<CommandResult, CliError> {
    if args.email.trim().is_empty() {
        return Err(CliError::Command("email cannot be empty".to_owned()));
    }

    let record = store
        .directory()
        .register(&args.email, args.id.as_deref(), args.name.as_deref())?;
    CommandResult::json(&record)
}
