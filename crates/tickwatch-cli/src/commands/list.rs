use serde::Serialize;
use tickwatch_store::{Store, WatchlistEntry};

use crate::cli::UserArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct ListResponseData {
    email: String,
    entries: Vec<WatchlistEntry>,
}

pub fn run(args: &UserArgs, store: &Store) -> Result<CommandResult, CliError> {
    let entries = store.watchlist().list(&args.email);
    CommandResult::json(&ListResponseData {
        email: args.email.clone(),
        entries,
    })
}
