//! `DuckDB` connection pool.
//!
//! All pooled connections are cloned from one root connection, so they share
//! a single database instance (and therefore see each other's writes). This
//! also makes `:memory:` databases usable from several connections.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use ::duckdb::Connection;

use crate::StoreError;

pub const IN_MEMORY: &str = ":memory:";

struct PoolInner {
    db_path: PathBuf,
    max_idle: usize,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
}

/// Hands out connections to one `DuckDB` database.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Open the database at `path` (or an in-memory database for `:memory:`).
    ///
    /// At most `max_idle` released connections are kept for reuse.
    pub fn open(path: impl Into<PathBuf>, max_idle: usize) -> Result<Self, StoreError> {
        let db_path = path.into();
        let root = if db_path.as_os_str() == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(&db_path)?
        };
        configure_connection(&root)?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_idle: max_idle.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Take an idle connection or clone a new one from the root.
    pub fn acquire(&self) -> Result<PooledConnection, StoreError> {
        let reused = self
            .inner
            .idle
            .lock()
            .map_err(|_| StoreError::PoolPoisoned)?
            .pop();

        let connection = match reused {
            Some(connection) => connection,
            None => {
                let root = self.inner.root.lock().map_err(|_| StoreError::PoolPoisoned)?;
                let connection = root.try_clone()?;
                drop(root);
                configure_connection(&connection)?;
                connection
            }
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
        })
    }

    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }

    pub fn idle_count(&self) -> usize {
        self.inner.idle.lock().map(|idle| idle.len()).unwrap_or(0)
    }
}

/// A connection that returns to the pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        self.connection
            .as_ref()
            .expect("pooled connection is present until drop")
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.connection
            .as_mut()
            .expect("pooled connection is present until drop")
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };

        if let Ok(mut idle) = self.pool.idle.lock() {
            if idle.len() < self.pool.max_idle {
                idle.push(connection);
            }
        }
    }
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_connections_are_reused_up_to_the_limit() {
        let manager = DuckDbConnectionManager::open(IN_MEMORY, 1).expect("open");

        let first = manager.acquire().expect("first");
        let second = manager.acquire().expect("second");
        drop(first);
        drop(second);

        assert_eq!(manager.idle_count(), 1);
    }

    #[test]
    fn cloned_connections_share_one_in_memory_database() {
        let manager = DuckDbConnectionManager::open(IN_MEMORY, 2).expect("open");

        let writer = manager.acquire().expect("writer");
        writer
            .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (7);")
            .expect("write");

        let reader = manager.acquire().expect("reader");
        let value: i64 = reader
            .query_row("SELECT v FROM t", [], |row| row.get(0))
            .expect("read");
        assert_eq!(value, 7);
    }
}
