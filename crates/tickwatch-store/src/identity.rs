//! Email → user id resolution.
//!
//! User records belong to the authentication provider and are only read
//! here, apart from [`UserDirectory::register`] which seeds records for
//! local setups and tests.
//!
//! [`CachingIdentityResolver`] caches positive resolutions for a TTL.
//! Misses and failures are never cached, so a user registered after a
//! failed lookup resolves on the next call.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use ::duckdb::params;
use serde::Serialize;
use uuid::Uuid;

use crate::duckdb::DuckDbConnectionManager;
use crate::StoreError;

/// Identifier of a user as stored in `watchlist.user_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps an email address to a user id.
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when no usable record exists for `email`.
    fn resolve(&self, email: &str) -> Result<Option<UserId>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRecord {
    pub record_key: String,
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
}

impl UserRecord {
    /// `id` when present, else the record key. `None` if both are blank.
    pub fn resolved_id(&self) -> Option<UserId> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .or_else(|| Some(self.record_key.trim()).filter(|key| !key.is_empty()))
            .map(|id| UserId(id.to_owned()))
    }
}

/// User records in the `users` table.
#[derive(Clone)]
pub struct UserDirectory {
    manager: DuckDbConnectionManager,
}

impl UserDirectory {
    pub fn new(manager: DuckDbConnectionManager) -> Self {
        Self { manager }
    }

    /// First record (by `record_key`) whose email matches exactly.
    pub fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        if email.trim().is_empty() {
            return Ok(None);
        }

        let connection = self.manager.acquire()?;
        let mut statement = connection.prepare(
            "SELECT record_key, id, email, name FROM users WHERE email = ? ORDER BY record_key LIMIT 1",
        )?;
        let mut rows = statement.query_map(params![email], |row| {
            Ok(UserRecord {
                record_key: row.get(0)?,
                id: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
            })
        })?;

        match rows.next() {
            Some(record) => Ok(Some(record?)),
            None => Ok(None),
        }
    }

    /// Insert a user unless one with this email already exists.
    ///
    /// Returns the existing record in that case. A fresh record key is
    /// generated for new users.
    pub fn register(
        &self,
        email: &str,
        id: Option<&str>,
        name: Option<&str>,
    ) -> Result<UserRecord, StoreError> {
        if let Some(existing) = self.find_by_email(email)? {
            return Ok(existing);
        }

        let record = UserRecord {
            record_key: Uuid::new_v4().to_string(),
            id: id.map(str::to_owned),
            email: email.to_owned(),
            name: name.map(str::to_owned),
        };

        let connection = self.manager.acquire()?;
        connection.execute(
            "INSERT INTO users (record_key, id, email, name) VALUES (?, ?, ?, ?)",
            params![record.record_key, record.id, record.email, record.name],
        )?;

        tracing::info!(email = %record.email, record_key = %record.record_key, "registered user");
        Ok(record)
    }
}

impl IdentityResolver for UserDirectory {
    fn resolve(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        Ok(self
            .find_by_email(email)?
            .and_then(|record| record.resolved_id()))
    }
}

struct CachedIdentity {
    user_id: UserId,
    expires_at: Instant,
}

/// Positive-only TTL cache in front of another resolver.
pub struct CachingIdentityResolver<R> {
    inner: R,
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedIdentity>>,
}

impl<R: IdentityResolver> CachingIdentityResolver<R> {
    pub fn new(inner: R, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self, email: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(email);
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    fn cached(&self, email: &str) -> Option<UserId> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(email) {
            Some(entry) if entry.expires_at > Instant::now() => Some(entry.user_id.clone()),
            Some(_) => {
                entries.remove(email);
                None
            }
            None => None,
        }
    }
}

impl<R: IdentityResolver> IdentityResolver for CachingIdentityResolver<R> {
    fn resolve(&self, email: &str) -> Result<Option<UserId>, StoreError> {
        if let Some(user_id) = self.cached(email) {
            tracing::debug!(email, "identity cache hit");
            return Ok(Some(user_id));
        }

        let resolved = self.inner.resolve(email)?;
        if let Some(user_id) = &resolved {
            if !self.ttl.is_zero() {
                if let Ok(mut entries) = self.entries.lock() {
                    entries.insert(
                        email.to_owned(),
                        CachedIdentity {
                            user_id: user_id.clone(),
                            expires_at: Instant::now() + self.ttl,
                        },
                    );
                }
            }
        }
        Ok(resolved)
    }
}
