//! Async access to the watchlist.
//!
//! `WatchlistStore` is synchronous (DuckDB); the blanket implementation
//! here moves each call onto the blocking pool.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;
use tickwatch_core::Symbol;
use tickwatch_store::{MutationOutcome, WatchlistEntry, WatchlistStore};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("watchlist task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("watchlist backend unavailable: {0}")]
    Unavailable(String),
}

pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, BackendError>> + Send + 'a>>;

pub trait WatchlistBackend: Send + Sync {
    fn list<'a>(&'a self, email: &'a str) -> BackendFuture<'a, Vec<WatchlistEntry>>;

    fn symbols<'a>(&'a self, email: &'a str) -> BackendFuture<'a, Vec<Symbol>> {
        Box::pin(async move {
            let entries = self.list(email).await?;
            Ok(entries.into_iter().map(|entry| entry.symbol).collect())
        })
    }

    fn add<'a>(
        &'a self,
        email: &'a str,
        symbol: &'a str,
        company: &'a str,
    ) -> BackendFuture<'a, MutationOutcome>;

    fn remove<'a>(&'a self, email: &'a str, symbol: &'a str) -> BackendFuture<'a, MutationOutcome>;
}

fn blocking<T, F>(work: F) -> BackendFuture<'static, T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    Box::pin(async move { Ok(tokio::task::spawn_blocking(work).await?) })
}

impl WatchlistBackend for WatchlistStore {
    fn list<'a>(&'a self, email: &'a str) -> BackendFuture<'a, Vec<WatchlistEntry>> {
        let store = self.clone();
        let email = email.to_owned();
        blocking(move || store.list(&email))
    }

    fn add<'a>(
        &'a self,
        email: &'a str,
        symbol: &'a str,
        company: &'a str,
    ) -> BackendFuture<'a, MutationOutcome> {
        let store = self.clone();
        let (email, symbol, company) = (email.to_owned(), symbol.to_owned(), company.to_owned());
        blocking(move || store.add(&email, &symbol, &company))
    }

    fn remove<'a>(&'a self, email: &'a str, symbol: &'a str) -> BackendFuture<'a, MutationOutcome> {
        let store = self.clone();
        let (email, symbol) = (email.to_owned(), symbol.to_owned());
        blocking(move || store.remove(&email, &symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwatch_store::{Store, StoreConfig};

    #[tokio::test]
    async fn store_calls_run_off_the_async_runtime() {
        let store = Store::open(StoreConfig::in_memory()).expect("open");
        store
            .directory()
            .register("a@x.com", Some("user-1"), None)
            .expect("register");
        let backend = store.watchlist();

        let added = WatchlistBackend::add(&backend, "a@x.com", "aapl", "Apple Inc.")
            .await
            .expect("add");
        assert!(added.success);

        let entries = WatchlistBackend::list(&backend, "a@x.com").await.expect("list");
        assert_eq!(entries.len(), 1);

        let removed = WatchlistBackend::remove(&backend, "a@x.com", "AAPL")
            .await
            .expect("remove");
        assert_eq!(removed.message, "Removed from watchlist");
    }
}
