//! Market-data client configuration.

use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io/api/v1";

/// Primary and fallback environment variables holding the API token.
pub const TOKEN_ENV_VARS: [&str; 2] = ["FINNHUB_API_KEY", "NEXT_PUBLIC_FINNHUB_API_KEY"];

pub const BASE_URL_ENV_VAR: &str = "FINNHUB_BASE_URL";

/// Settings for [`MarketDataClient`](crate::MarketDataClient).
///
/// The client never reads the environment itself; build the config with
/// [`MarketDataConfig::from_env`] at startup and pass it in.
#[derive(Clone, PartialEq, Eq)]
pub struct MarketDataConfig {
    pub base_url: String,
    /// Without a token every fetch degrades to an empty result.
    pub api_token: Option<String>,
    pub quote_ttl: Duration,
    pub profile_ttl: Duration,
    pub timeout_ms: Option<u64>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            api_token: None,
            quote_ttl: Duration::from_secs(60),
            profile_ttl: Duration::from_secs(3600),
            timeout_ms: Some(5_000),
        }
    }
}

impl MarketDataConfig {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            api_token: Some(token.into()),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_token = TOKEN_ENV_VARS.iter().find_map(|&name| present(name));
        let base_url = present(BASE_URL_ENV_VAR)
            .map(|url| url.trim_end_matches('/').to_owned())
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL));

        Self {
            base_url,
            api_token,
            ..Self::default()
        }
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }
}

impl std::fmt::Debug for MarketDataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarketDataConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("quote_ttl", &self.quote_ttl)
            .field("profile_ttl", &self.profile_ttl)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
