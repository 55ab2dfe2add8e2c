mod add;
mod list;
mod register_user;
mod remove;
mod serve;
mod show;
mod symbols;

use serde::Serialize;
use serde_json::Value;
use tickwatch_store::{MutationOutcome, Store, StoreConfig};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub enum Output {
    Json(Value),
    Text(String),
    None,
}

pub struct CommandResult {
    pub output: Output,
    /// Set when the command ran but the requested change was rejected.
    pub failed: bool,
}

impl CommandResult {
    pub fn json(data: &impl Serialize) -> Result<Self, CliError> {
        Ok(Self {
            output: Output::Json(serde_json::to_value(data)?),
            failed: false,
        })
    }

    pub fn text(text: String) -> Self {
        Self {
            output: Output::Text(text),
            failed: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            output: Output::None,
            failed: false,
        }
    }

    pub fn outcome(outcome: &MutationOutcome) -> Result<Self, CliError> {
        let mut result = Self::json(outcome)?;
        result.failed = !outcome.success;
        Ok(result)
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let store = open_store(cli)?;

    match &cli.command {
        Command::Serve(args) => serve::run(args, &store).await,
        Command::List(args) => list::run(args, &store),
        Command::Symbols(args) => symbols::run(args, &store),
        Command::Show(args) => show::run(args, &store).await,
        Command::Add(args) => add::run(args, &store),
        Command::Remove(args) => remove::run(args, &store),
        Command::RegisterUser(args) => register_user::run(args, &store),
    }
}

fn open_store(cli: &Cli) -> Result<Store, CliError> {
    let config = match &cli.db_path {
        Some(path) => StoreConfig::at_path(path),
        None => StoreConfig::default(),
    };
    Ok(Store::open(config)?)
}
