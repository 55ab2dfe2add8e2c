use tickwatch_store::Store;

use crate::cli::AddArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &AddArgs, store: &Store) -> Result<CommandResult, CliError> {
    let outcome = store
        .watchlist()
        .add(&args.email, &args.symbol, &args.company);
    CommandResult::outcome(&outcome)
}
