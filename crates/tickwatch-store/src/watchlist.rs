use std::sync::Arc;

use ::duckdb::params;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tickwatch_core::{Symbol, UtcDateTime};

use crate::duckdb::DuckDbConnectionManager;
use crate::identity::{IdentityResolver, UserId};
use crate::StoreError;

/// One saved symbol for a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WatchlistEntry {
    pub user_id: String,
    pub symbol: Symbol,
    pub company: String,
    pub added_at: UtcDateTime,
}

/// Why a mutation was rejected. Enrichment failures are reported by
/// `MarketDataError` instead and never reach a mutation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    UserNotFound,
    DuplicateEntry,
    EntryNotFound,
    MissingFields,
    StorageUnavailable,
}

#[derive(Debug, Error)]
pub enum WatchlistError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("User not found")]
    UserNotFound,

    #[error("Stock already in watchlist")]
    DuplicateEntry,

    #[error("Stock not found in watchlist")]
    EntryNotFound,

    #[error("Failed to {action} watchlist")]
    Storage {
        action: &'static str,
        #[source]
        source: StoreError,
    },
}

impl WatchlistError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::MissingFields => FailureKind::MissingFields,
            Self::UserNotFound => FailureKind::UserNotFound,
            Self::DuplicateEntry => FailureKind::DuplicateEntry,
            Self::EntryNotFound => FailureKind::EntryNotFound,
            Self::Storage { .. } => FailureKind::StorageUnavailable,
        }
    }

    fn storage(action: &'static str, source: impl Into<StoreError>) -> Self {
        Self::Storage {
            action,
            source: source.into(),
        }
    }
}

/// Result of an add/remove as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub failure: Option<FailureKind>,
}

impl MutationOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            failure: Some(kind),
        }
    }
}

impl From<Result<&'static str, WatchlistError>> for MutationOutcome {
    fn from(result: Result<&'static str, WatchlistError>) -> Self {
        match result {
            Ok(message) => Self::ok(message),
            Err(error) => Self::failed(error.kind(), error.to_string()),
        }
    }
}

const ADD_ACTION: &str = "add to";
const REMOVE_ACTION: &str = "remove from";

/// Per-user watchlists keyed on `(user_id, symbol)`.
#[derive(Clone)]
pub struct WatchlistStore {
    manager: DuckDbConnectionManager,
    identity: Arc<dyn IdentityResolver>,
}

impl WatchlistStore {
    pub fn new(manager: DuckDbConnectionManager, identity: Arc<dyn IdentityResolver>) -> Self {
        Self { manager, identity }
    }

    /// Entries for `email`, newest first. Empty on any failure.
    pub fn list(&self, email: &str) -> Vec<WatchlistEntry> {
        let Some(user_id) = self.resolve_quietly(email) else {
            return Vec::new();
        };

        match self.query_entries(&user_id) {
            Ok(entries) => entries,
            Err(error) => {
                tracing::error!(user_id = %user_id, error = %error, "failed to load watchlist");
                Vec::new()
            }
        }
    }

    /// Symbols for `email` in [`list`](Self::list) order.
    pub fn symbols(&self, email: &str) -> Vec<Symbol> {
        self.list(email)
            .into_iter()
            .map(|entry| entry.symbol)
            .collect()
    }

    pub fn contains(&self, email: &str, symbol: &str) -> bool {
        let Ok(symbol) = Symbol::parse(symbol) else {
            return false;
        };
        let Some(user_id) = self.resolve_quietly(email) else {
            return false;
        };

        match self.entry_exists(&user_id, &symbol) {
            Ok(exists) => exists,
            Err(error) => {
                tracing::error!(user_id = %user_id, %symbol, error = %error, "watchlist lookup failed");
                false
            }
        }
    }

    pub fn add(&self, email: &str, symbol: &str, company: &str) -> MutationOutcome {
        self.try_add(email, symbol, company)
            .map(|()| "Added to watchlist")
            .into()
    }

    pub fn add_at(
        &self,
        email: &str,
        symbol: &str,
        company: &str,
        added_at: UtcDateTime,
    ) -> MutationOutcome {
        self.try_add_at(email, symbol, company, added_at)
            .map(|()| "Added to watchlist")
            .into()
    }

    pub fn remove(&self, email: &str, symbol: &str) -> MutationOutcome {
        self.try_remove(email, symbol)
            .map(|()| "Removed from watchlist")
            .into()
    }

    pub fn try_add(&self, email: &str, symbol: &str, company: &str) -> Result<(), WatchlistError> {
        self.try_add_at(email, symbol, company, UtcDateTime::now())
    }

    pub fn try_add_at(
        &self,
        email: &str,
        symbol: &str,
        company: &str,
        added_at: UtcDateTime,
    ) -> Result<(), WatchlistError> {
        if email.trim().is_empty() || symbol.trim().is_empty() || company.trim().is_empty() {
            return Err(WatchlistError::MissingFields);
        }
        let symbol = Symbol::parse(symbol).map_err(|_| WatchlistError::MissingFields)?;
        let user_id = self.resolve_required(email, ADD_ACTION)?;

        let exists = self
            .entry_exists(&user_id, &symbol)
            .map_err(|error| self.storage_failure(ADD_ACTION, &user_id, &symbol, error))?;
        if exists {
            return Err(WatchlistError::DuplicateEntry);
        }

        match self.insert_entry(&user_id, &symbol, company.trim(), added_at) {
            Ok(()) => {
                tracing::info!(user_id = %user_id, %symbol, "added to watchlist");
                Ok(())
            }
            Err(StoreError::DuckDb(error)) if is_constraint_violation(&error) => {
                Err(WatchlistError::DuplicateEntry)
            }
            Err(error) => Err(self.storage_failure(ADD_ACTION, &user_id, &symbol, error)),
        }
    }

    pub fn try_remove(&self, email: &str, symbol: &str) -> Result<(), WatchlistError> {
        if email.trim().is_empty() || symbol.trim().is_empty() {
            return Err(WatchlistError::MissingFields);
        }
        let symbol = Symbol::parse(symbol).map_err(|_| WatchlistError::MissingFields)?;
        let user_id = self.resolve_required(email, REMOVE_ACTION)?;

        let deleted = self
            .delete_entry(&user_id, &symbol)
            .map_err(|error| self.storage_failure(REMOVE_ACTION, &user_id, &symbol, error))?;
        if deleted == 0 {
            return Err(WatchlistError::EntryNotFound);
        }

        tracing::info!(user_id = %user_id, %symbol, "removed from watchlist");
        Ok(())
    }

    fn resolve_quietly(&self, email: &str) -> Option<UserId> {
        if email.trim().is_empty() {
            return None;
        }
        match self.identity.resolve(email) {
            Ok(user_id) => user_id,
            Err(error) => {
                tracing::warn!(email, error = %error, "identity lookup failed");
                None
            }
        }
    }

    fn resolve_required(&self, email: &str, action: &'static str) -> Result<UserId, WatchlistError> {
        match self.identity.resolve(email) {
            Ok(Some(user_id)) => Ok(user_id),
            Ok(None) => Err(WatchlistError::UserNotFound),
            Err(error) => {
                tracing::warn!(email, action, error = %error, "identity lookup failed");
                Err(WatchlistError::UserNotFound)
            }
        }
    }

    fn storage_failure(
        &self,
        action: &'static str,
        user_id: &UserId,
        symbol: &Symbol,
        error: impl Into<StoreError>,
    ) -> WatchlistError {
        let error = WatchlistError::storage(action, error);
        tracing::error!(user_id = %user_id, %symbol, action, error = ?error, "watchlist write failed");
        error
    }

    fn query_entries(&self, user_id: &UserId) -> Result<Vec<WatchlistEntry>, StoreError> {
        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            r#"
SELECT user_id, symbol, company, strftime(added_at, '%Y-%m-%d %H:%M:%S.%f')
FROM watchlist
WHERE user_id = ?
ORDER BY added_at DESC, symbol ASC
"#,
        )?;

        let rows = statement
            .query_map(params![user_id.as_str()], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(user_id, symbol, company, added_at)| {
                match decode_entry(user_id, &symbol, company, &added_at) {
                    Ok(entry) => Some(entry),
                    Err(error) => {
                        tracing::warn!(error = %error, "skipping unreadable watchlist row");
                        None
                    }
                }
            })
            .collect())
    }

    fn entry_exists(&self, user_id: &UserId, symbol: &Symbol) -> Result<bool, StoreError> {
        let connection = self.manager.acquire()?;
        let count: i64 = connection.query_row(
            "SELECT COUNT(*) FROM watchlist WHERE user_id = ? AND symbol = ?",
            params![user_id.as_str(), symbol.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_entry(
        &self,
        user_id: &UserId,
        symbol: &Symbol,
        company: &str,
        added_at: UtcDateTime,
    ) -> Result<(), StoreError> {
        let connection = self.manager.acquire()?;
        connection.execute(
            "INSERT INTO watchlist (user_id, symbol, company, added_at) VALUES (?, ?, ?, CAST(? AS TIMESTAMP))",
            params![user_id.as_str(), symbol.as_str(), company, added_at.format_sql()],
        )?;
        Ok(())
    }

    fn delete_entry(&self, user_id: &UserId, symbol: &Symbol) -> Result<usize, StoreError> {
        let connection = self.manager.acquire()?;
        let deleted = connection.execute(
            "DELETE FROM watchlist WHERE user_id = ? AND symbol = ?",
            params![user_id.as_str(), symbol.as_str()],
        )?;
        Ok(deleted)
    }
}

fn decode_entry(
    user_id: String,
    symbol: &str,
    company: String,
    added_at: &str,
) -> Result<WatchlistEntry, StoreError> {
    let symbol = Symbol::parse(symbol)
        .map_err(|error| StoreError::Corrupt(format!("symbol '{symbol}': {error}")))?;
    let added_at = UtcDateTime::parse_sql(added_at)
        .map_err(|error| StoreError::Corrupt(format!("added_at '{added_at}': {error}")))?;
    Ok(WatchlistEntry {
        user_id,
        symbol,
        company,
        added_at,
    })
}

// The C API reports every failure with the same generic code, so the
// message is all there is to go on. Statement-time and commit-time
// conflicts are worded differently.
const CONSTRAINT_MARKERS: [&str; 4] = [
    "duplicate key",
    "violates primary key",
    "constraint violation",
    "constraint violated",
];

fn is_constraint_violation(error: &::duckdb::Error) -> bool {
    is_constraint_message(&error.to_string())
}

fn is_constraint_message(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    CONSTRAINT_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
