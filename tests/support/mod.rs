//! Shared fixtures for the behavior suites.
#![allow(dead_code)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use tickwatch_core::{
    HttpClient, HttpError, HttpRequest, HttpResponse, MarketDataClient, MarketDataConfig,
};
use tickwatch_store::{Store, StoreConfig};

/// In-memory stand-in for the quote and profile endpoints, scripted per symbol.
///
/// Unscripted symbols answer `200 {}` like upstream does for unknown tickers.
#[derive(Default)]
pub struct FakeFinnhub {
    quotes: HashMap<String, Result<HttpResponse, HttpError>>,
    profiles: HashMap<String, Result<HttpResponse, HttpError>>,
    requests: Mutex<Vec<String>>,
    latency: Option<Duration>,
}

impl FakeFinnhub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quote(mut self, symbol: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.quotes.insert(symbol.to_owned(), response);
        self
    }

    pub fn profile(mut self, symbol: &str, response: Result<HttpResponse, HttpError>) -> Self {
        self.profiles.insert(symbol.to_owned(), response);
        self
    }

    pub fn quote_json(self, symbol: &str, body: &str) -> Self {
        self.quote(symbol, Ok(HttpResponse::ok_json(body)))
    }

    pub fn profile_json(self, symbol: &str, body: &str) -> Self {
        self.profile(symbol, Ok(HttpResponse::ok_json(body)))
    }

    /// Delay every response by `latency` of tokio time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("lock").len()
    }

    /// Requests whose URL contains `fragment`.
    pub fn requests_matching(&self, fragment: &str) -> usize {
        self.requests
            .lock()
            .expect("lock")
            .iter()
            .filter(|url| url.contains(fragment))
            .count()
    }
}

fn query_symbol(url: &str) -> String {
    url.split_once("symbol=")
        .map(|(_, rest)| rest.split('&').next().unwrap_or_default().to_owned())
        .unwrap_or_default()
}

impl HttpClient for FakeFinnhub {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let symbol = query_symbol(&request.url);
        let scripted = if request.url.contains("/stock/profile2?") {
            self.profiles.get(&symbol).cloned()
        } else {
            self.quotes.get(&symbol).cloned()
        };
        self.requests.lock().expect("lock").push(request.url);
        let latency = self.latency;
        Box::pin(async move {
            if let Some(latency) = latency {
                tokio::time::sleep(latency).await;
            }
            scripted.unwrap_or_else(|| Ok(HttpResponse::ok_json("{}")))
        })
    }
}

pub fn market_client(fake: Arc<FakeFinnhub>) -> MarketDataClient {
    MarketDataClient::new(MarketDataConfig::with_token("test-token"), fake)
}

/// Store in a temp directory with one registered user per `(email, id)`.
pub fn store_with_users(users: &[(&str, &str)]) -> (TempDir, Store) {
    let temp = tempfile::tempdir().expect("tempdir");
    let store = Store::open(StoreConfig::at_path(temp.path().join("watchlist.duckdb")))
        .expect("store open");
    for &(email, id) in users {
        store
            .directory()
            .register(email, Some(id), None)
            .expect("register user");
    }
    (temp, store)
}
