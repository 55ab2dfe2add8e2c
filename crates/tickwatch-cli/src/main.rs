mod cli;
mod commands;
mod error;

use clap::Parser;
use std::io::Write;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::commands::Output;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tickwatch=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();

    let result = commands::run(&cli).await?;
    let mut stdout = std::io::stdout().lock();
    match &result.output {
        Output::Json(value) if cli.pretty => writeln!(stdout, "{}", serde_json::to_string_pretty(value)?)?,
        Output::Json(value) => writeln!(stdout, "{}", serde_json::to_string(value)?)?,
        Output::Text(text) => write!(stdout, "{text}")?,
        Output::None => {}
    }

    // Rejected mutations still print their outcome but fail the process.
    if result.failed {
        return Ok(ExitCode::from(3));
    }

    Ok(ExitCode::SUCCESS)
}
