//! # Tickwatch Store
//!
//! DuckDB persistence for the watchlist feature.
//!
//! ## Tables
//!
//! | Table | Owner | Description |
//! |-------|-------|-------------|
//! | `users` | auth provider | User records, looked up by exact email |
//! | `watchlist` | this crate | One row per `(user_id, symbol)` |
//! | `schema_migrations` | this crate | Applied migration versions |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tickwatch_store::{Store, StoreConfig};
//!
//! fn main() -> Result<(), tickwatch_store::StoreError> {
//!     let store = Store::open(StoreConfig::default())?;
//!     let watchlist = store.watchlist();
//!
//!     let outcome = watchlist.add("a@x.com", "aapl", "Apple Inc.");
//!     println!("{}", outcome.message);
//!
//!     for entry in watchlist.list("a@x.com") {
//!         println!("{} {}", entry.symbol, entry.company);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! All user input reaches SQL as bound parameters.

pub mod duckdb;
pub mod identity;
pub mod migrations;
pub mod watchlist;

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection, IN_MEMORY};
pub use identity::{CachingIdentityResolver, IdentityResolver, UserDirectory, UserId, UserRecord};
pub use watchlist::{FailureKind, MutationOutcome, WatchlistEntry, WatchlistError, WatchlistStore};

/// Errors raised by the storage layer itself.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error while preparing the database directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("connection pool lock poisoned")]
    PoolPoisoned,

    /// A stored row no longer satisfies the domain invariants.
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Location and tuning of the watchlist database.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Root directory for tickwatch data.
    pub tickwatch_home: PathBuf,
    /// Path to the `DuckDB` database file, or `:memory:`.
    pub db_path: PathBuf,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
    /// How long a resolved email → user id mapping is reused.
    pub identity_ttl: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let tickwatch_home = resolve_tickwatch_home();
        let db_path = tickwatch_home.join("watchlist.duckdb");
        Self {
            tickwatch_home,
            db_path,
            max_pool_size: 4,
            identity_ttl: Duration::from_secs(300),
        }
    }
}

impl StoreConfig {
    pub fn at_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    pub fn in_memory() -> Self {
        Self::at_path(IN_MEMORY)
    }
}

/// Opened database plus factories for the services built on it.
#[derive(Clone)]
pub struct Store {
    config: StoreConfig,
    manager: DuckDbConnectionManager,
}

impl Store {
    pub fn open_default() -> Result<Self, StoreError> {
        Self::open(StoreConfig::default())
    }

    /// Open (creating if needed) the database and apply pending migrations.
    pub fn open(config: StoreConfig) -> Result<Self, StoreError> {
        if config.db_path.as_os_str() != IN_MEMORY {
            if let Some(parent) = config.db_path.parent() {
                fs::create_dir_all(parent)?;
            }
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        let connection = manager.acquire()?;
        migrations::apply_migrations(&connection)?;
        drop(connection);

        tracing::debug!(db_path = %config.db_path.display(), "watchlist store ready");
        Ok(Self { config, manager })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn connections(&self) -> &DuckDbConnectionManager {
        &self.manager
    }

    /// Direct access to the user records.
    pub fn directory(&self) -> UserDirectory {
        UserDirectory::new(self.manager.clone())
    }

    /// Watchlist service resolving identities through a TTL cache.
    pub fn watchlist(&self) -> WatchlistStore {
        let resolver = CachingIdentityResolver::new(self.directory(), self.config.identity_ttl);
        WatchlistStore::new(self.manager.clone(), Arc::new(resolver))
    }
}

fn resolve_tickwatch_home() -> PathBuf {
    if let Some(path) = env::var_os("TICKWATCH_HOME") {
        let path = PathBuf::from(path);
        if !path.as_os_str().is_empty() {
            return path;
        }
    }

    if let Some(home) = env::var_os("HOME") {
        return PathBuf::from(home).join(".tickwatch");
    }

    PathBuf::from(".tickwatch")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn open_creates_parent_directories() {
        let temp = tempdir().expect("tempdir");
        let db_path = temp.path().join("nested").join("watchlist.duckdb");

        let store = Store::open(StoreConfig::at_path(&db_path)).expect("open");

        assert!(db_path.exists());
        assert_eq!(store.connections().db_path(), db_path.as_path());
    }

    #[test]
    fn reopening_keeps_existing_rows() {
        let temp = tempdir().expect("tempdir");
        let db_path = temp.path().join("watchlist.duckdb");

        {
            let store = Store::open(StoreConfig::at_path(&db_path)).expect("open");
            store
                .directory()
                .register("a@x.com", Some("user-1"), None)
                .expect("register");
            assert!(store.watchlist().add("a@x.com", "aapl", "Apple Inc.").success);
        }

        let store = Store::open(StoreConfig::at_path(&db_path)).expect("reopen");
        let symbols = store.watchlist().symbols("a@x.com");
        assert_eq!(symbols.len(), 1);
        assert_eq!(symbols[0].as_str(), "AAPL");
    }
}
