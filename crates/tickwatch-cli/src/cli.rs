//! CLI argument definitions for tickwatch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `serve` | Run the HTTP API |
//! | `list` | Watchlist entries for a user |
//! | `symbols` | Watchlist symbols for a user |
//! | `show` | Render the enriched watchlist page |
//! | `add` | Add a symbol to a watchlist |
//! | `remove` | Remove a symbol from a watchlist |
//! | `register-user` | Create a user record |
//!
//! # Examples
//!
//! ```bash
//! tickwatch register-user a@x.com --id user-1
//! tickwatch add a@x.com aapl "Apple Inc."
//! tickwatch show a@x.com --text
//! tickwatch serve --bind 0.0.0.0:3000
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Personal stock watchlist with live market data.
#[derive(Debug, Parser)]
#[command(name = "tickwatch", author, version, about = "Personal stock watchlist")]
pub struct Cli {
    /// DuckDB database file (default: $TICKWATCH_HOME/watchlist.duckdb).
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve(ServeArgs),

    /// List watchlist entries, newest first.
    List(UserArgs),

    /// List watchlist symbols only.
    Symbols(UserArgs),

    /// Render the watchlist page with quotes and profiles.
    ///
    /// Without an email the sign-in prompt is shown.
    Show(ShowArgs),

    /// Add a symbol to a user's watchlist.
    Add(AddArgs),

    /// Remove a symbol from a user's watchlist.
    Remove(RemoveArgs),

    /// Create a user record (no-op if the email exists).
    RegisterUser(RegisterUserArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on (default: $TICKWATCH_BIND_ADDR or 127.0.0.1:3000).
    #[arg(long)]
    pub bind: Option<SocketAddr>,

    /// Request header carrying the user's email.
    #[arg(long)]
    pub session_header: Option<String>,
}

#[derive(Debug, Args)]
pub struct UserArgs {
    pub email: String,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    pub email: Option<String>,

    /// Print a text rendering instead of JSON.
    #[arg(long, default_value_t = false)]
    pub text: bool,

    /// Skip market data; every card shows stored values only.
    #[arg(long, default_value_t = false)]
    pub offline: bool,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub email: String,
    pub symbol: String,
    pub company: String,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    pub email: String,
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct RegisterUserArgs {
    pub email: String,

    /// Explicit user id; the generated record key is used when absent.
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub name: Option<String>,
}
