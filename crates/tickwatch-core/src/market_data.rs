//! Best-effort quote and profile enrichment from the market-data API.
//!
//! Enrichment must never block a watchlist from rendering, so the public
//! `get_*` methods swallow every failure and return an empty record. The
//! `try_*` variants keep the failure for callers that want to report it.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::{CacheMode, CacheStore};
use crate::config::MarketDataConfig;
use crate::http_client::{HttpClient, HttpError, HttpRequest};
use crate::{Enrichment, ProfileData, QuoteData, Symbol};

/// Why an enrichment fetch produced no data.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("market-data API token is not configured")]
    MissingToken,

    #[error("{endpoint} request returned status {status}")]
    Upstream { endpoint: &'static str, status: u16 },

    #[error("{endpoint} transport error: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: HttpError,
    },

    #[error("{endpoint} response could not be decoded: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Quote,
    Profile,
}

impl Endpoint {
    const fn name(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Profile => "profile",
        }
    }

    const fn path(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Profile => "stock/profile2",
        }
    }

    fn ttl(self, config: &MarketDataConfig) -> Duration {
        match self {
            Self::Quote => config.quote_ttl,
            Self::Profile => config.profile_ttl,
        }
    }

    fn cache_key(self, symbol: &Symbol) -> String {
        format!("{}:{}", self.name(), symbol)
    }
}

/// Client for the quote and company-profile endpoints.
#[derive(Clone)]
pub struct MarketDataClient {
    config: Arc<MarketDataConfig>,
    http_client: Arc<dyn HttpClient>,
    cache: CacheStore,
    cache_mode: CacheMode,
}

impl MarketDataClient {
    pub fn new(config: MarketDataConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config: Arc::new(config),
            http_client,
            cache: CacheStore::new(),
            cache_mode: CacheMode::Use,
        }
    }

    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Share a response cache between clients.
    pub fn with_cache(mut self, cache: CacheStore) -> Self {
        self.cache = cache;
        self
    }

    pub fn config(&self) -> &MarketDataConfig {
        &self.config
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    pub async fn get_quote(&self, symbol: &Symbol) -> QuoteData {
        absorb(symbol, Endpoint::Quote, self.try_get_quote(symbol).await)
    }

    pub async fn get_profile(&self, symbol: &Symbol) -> ProfileData {
        absorb(symbol, Endpoint::Profile, self.try_get_profile(symbol).await)
    }

    /// Quote and profile for `symbol`, fetched concurrently.
    pub async fn enrich(&self, symbol: &Symbol) -> Enrichment {
        let (quote, profile) = tokio::join!(self.get_quote(symbol), self.get_profile(symbol));
        Enrichment { quote, profile }
    }

    pub async fn try_get_quote(&self, symbol: &Symbol) -> Result<QuoteData, MarketDataError> {
        self.fetch(Endpoint::Quote, symbol).await
    }

    pub async fn try_get_profile(&self, symbol: &Symbol) -> Result<ProfileData, MarketDataError> {
        self.fetch(Endpoint::Profile, symbol).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        symbol: &Symbol,
    ) -> Result<T, MarketDataError> {
        let token = self
            .config
            .api_token
            .as_deref()
            .ok_or(MarketDataError::MissingToken)?;

        let key = endpoint.cache_key(symbol);
        if self.cache_mode.reads() {
            if let Some(body) = self.cache.get(&key).await {
                debug!(%symbol, endpoint = endpoint.name(), "market-data cache hit");
                return decode(endpoint, &body);
            }
        }

        let url = format!(
            "{}/{}?symbol={}&token={}",
            self.config.base_url,
            endpoint.path(),
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(token),
        );
        let mut request = HttpRequest::get(url).with_header("Accept", "application/json");
        if let Some(timeout_ms) = self.config.timeout_ms {
            request = request.with_timeout_ms(timeout_ms);
        }

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|source| MarketDataError::Transport {
                endpoint: endpoint.name(),
                source,
            })?;

        if !response.is_success() {
            return Err(MarketDataError::Upstream {
                endpoint: endpoint.name(),
                status: response.status,
            });
        }

        let value = decode(endpoint, &response.body)?;
        if self.cache_mode.writes() {
            self.cache
                .put(key, response.body, endpoint.ttl(&self.config))
                .await;
        }
        Ok(value)
    }
}

fn decode<T: DeserializeOwned>(endpoint: Endpoint, body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|source| MarketDataError::Decode {
        endpoint: endpoint.name(),
        source,
    })
}

fn absorb<T: Default>(
    symbol: &Symbol,
    endpoint: Endpoint,
    result: Result<T, MarketDataError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(MarketDataError::MissingToken) => {
            debug!(%symbol, endpoint = endpoint.name(), "no market-data token; skipping enrichment");
            T::default()
        }
        Err(error) => {
            warn!(%symbol, endpoint = endpoint.name(), %error, "enrichment unavailable");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    use super::*;
    use crate::http_client::HttpResponse;

    /// Answers by endpoint path and records every requested URL.
    #[derive(Default)]
    struct ScriptedClient {
        quote: Option<Result<HttpResponse, HttpError>>,
        profile: Option<Result<HttpResponse, HttpError>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedClient {
        fn urls(&self) -> Vec<String> {
            self.seen
                .lock()
                .expect("lock")
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for ScriptedClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            let scripted = if request.url.contains("/stock/profile2?") {
                self.profile.clone()
            } else {
                self.quote.clone()
            };
            self.seen.lock().expect("lock").push(request);
            Box::pin(async move { scripted.unwrap_or_else(|| Ok(HttpResponse::ok_json("{}"))) })
        }
    }

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").expect("symbol")
    }

    fn client(scripted: Arc<ScriptedClient>) -> MarketDataClient {
        MarketDataClient::new(MarketDataConfig::with_token("tok"), scripted)
    }

    #[tokio::test]
    async fn quote_request_targets_quote_endpoint_with_token() {
        let scripted = Arc::new(ScriptedClient {
            quote: Some(Ok(HttpResponse::ok_json(r#"{"c":189.5,"dp":1.25}"#))),
            ..ScriptedClient::default()
        });

        let quote = client(scripted.clone()).get_quote(&aapl()).await;

        assert_eq!(quote.current_price, Some(189.5));
        assert_eq!(quote.percent_change, Some(1.25));
        assert_eq!(
            scripted.urls(),
            vec![String::from("https://finnhub.io/api/v1/quote?symbol=AAPL&token=tok")]
        );
        let seen = scripted.seen.lock().expect("lock");
        assert_eq!(seen[0].timeout_ms, Some(5_000));
    }

    #[tokio::test]
    async fn missing_token_skips_the_network() {
        let scripted = Arc::new(ScriptedClient::default());
        let client = MarketDataClient::new(MarketDataConfig::default(), scripted.clone());

        assert!(client.get_quote(&aapl()).await.is_empty());
        assert!(matches!(
            client.try_get_profile(&aapl()).await,
            Err(MarketDataError::MissingToken)
        ));
        assert!(scripted.urls().is_empty());
    }

    #[tokio::test]
    async fn upstream_error_status_degrades_to_empty() {
        let scripted = Arc::new(ScriptedClient {
            quote: Some(Ok(HttpResponse::with_status(500, "oops"))),
            ..ScriptedClient::default()
        });
        let client = client(scripted);

        assert!(matches!(
            client.try_get_quote(&aapl()).await,
            Err(MarketDataError::Upstream { status: 500, .. })
        ));
        assert!(client.get_quote(&aapl()).await.is_empty());
    }

    #[tokio::test]
    async fn transport_timeout_degrades_to_empty() {
        let scripted = Arc::new(ScriptedClient {
            profile: Some(Err(HttpError::timeout("deadline elapsed"))),
            ..ScriptedClient::default()
        });
        let client = client(scripted);

        let error = client.try_get_profile(&aapl()).await.expect_err("timeout");
        assert!(matches!(error, MarketDataError::Transport { ref source, .. } if source.is_timeout()));
        assert!(client.get_profile(&aapl()).await.is_empty());
    }

    #[tokio::test]
    async fn undecodable_body_is_not_cached() {
        let scripted = Arc::new(ScriptedClient {
            quote: Some(Ok(HttpResponse::ok_json("<html>"))),
            ..ScriptedClient::default()
        });
        let client = client(scripted.clone());

        assert!(client.get_quote(&aapl()).await.is_empty());
        assert!(client.get_quote(&aapl()).await.is_empty());
        assert_eq!(scripted.urls().len(), 2);
        assert!(client.cache().is_empty().await);
    }

    #[tokio::test]
    async fn second_quote_within_ttl_is_served_from_cache() {
        let scripted = Arc::new(ScriptedClient {
            quote: Some(Ok(HttpResponse::ok_json(r#"{"c":10.0}"#))),
            ..ScriptedClient::default()
        });
        let client = client(scripted.clone());

        client.get_quote(&aapl()).await;
        let cached = client.get_quote(&aapl()).await;

        assert_eq!(cached.current_price, Some(10.0));
        assert_eq!(scripted.urls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn quote_expires_before_profile() {
        let scripted = Arc::new(ScriptedClient {
            quote: Some(Ok(HttpResponse::ok_json(r#"{"c":10.0}"#))),
            profile: Some(Ok(HttpResponse::ok_json(r#"{"name":"Apple Inc"}"#))),
            ..ScriptedClient::default()
        });
        let client = client(scripted.clone());

        client.enrich(&aapl()).await;
        tokio::time::advance(Duration::from_secs(61)).await;
        let enrichment = client.enrich(&aapl()).await;

        assert_eq!(enrichment.profile.display_name(), Some("Apple Inc"));
        let urls = scripted.urls();
        assert_eq!(urls.len(), 3, "only the quote is refetched: {urls:?}");
        assert!(urls[2].contains("/quote?"));
    }

    #[tokio::test]
    async fn bypass_mode_never_touches_cache() {
        let scripted = Arc::new(ScriptedClient::default());
        let client = client(scripted.clone()).with_cache_mode(CacheMode::Bypass);

        client.get_profile(&aapl()).await;
        client.get_profile(&aapl()).await;

        assert_eq!(scripted.urls().len(), 2);
        assert!(client.cache().is_empty().await);
    }

    #[tokio::test]
    async fn refresh_mode_fetches_but_still_populates_cache() {
        let scripted = Arc::new(ScriptedClient::default());
        let client = client(scripted.clone()).with_cache_mode(CacheMode::Refresh);

        client.get_quote(&aapl()).await;
        client.get_quote(&aapl()).await;

        assert_eq!(scripted.urls().len(), 2);
        assert_eq!(client.cache().len().await, 1);
    }

    #[tokio::test]
    async fn symbol_is_url_encoded() {
        let scripted = Arc::new(ScriptedClient::default());
        let symbol = Symbol::parse("brk.b").expect("symbol");

        client(scripted.clone()).get_profile(&symbol).await;

        assert_eq!(
            scripted.urls(),
            vec![String::from(
                "https://finnhub.io/api/v1/stock/profile2?symbol=BRK.B&token=tok"
            )]
        );
    }
}
