use serde::Serialize;
use tickwatch_core::Symbol;
use tickwatch_store::Store;

use crate::cli::UserArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SymbolsResponseData {
    email: String,
    symbols: Vec<Symbol>,
}

pub fn run(args: &UserArgs, store: &Store) -> Result<CommandResult, CliError> {
    let symbols = store.watchlist().symbols(&args.email);
    CommandResult::json(&SymbolsResponseData {
        email: args.email.clone(),
        symbols,
    })
}
