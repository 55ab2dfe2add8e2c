use tickwatch_store::Store;

use crate::cli::RemoveArgs;
use crate::error::CliError;

use super::CommandResult;

pub fn run(args: &RemoveArgs, store: &Store) -> Result<CommandResult, CliError> {
    let outcome = store.watchlist().remove(&args.email, &args.symbol);
    CommandResult::outcome(&outcome)
}
