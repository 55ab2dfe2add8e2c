//! # Tickwatch Core
//!
//! Domain types and market-data enrichment for the tickwatch watchlist.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | TTL cache for upstream response bodies |
//! | [`config`] | Market-data configuration (token, base URL, TTLs) |
//! | [`domain`] | Symbol, timestamp, quote and profile models |
//! | [`error`] | Validation errors |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`market_data`] | Quote/profile client with best-effort semantics |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tickwatch_core::{MarketDataClient, MarketDataConfig, ReqwestHttpClient, Symbol};
//!
//! # async fn run() -> Result<(), tickwatch_core::ValidationError> {
//! let client = MarketDataClient::new(
//!     MarketDataConfig::from_env(),
//!     Arc::new(ReqwestHttpClient::new()),
//! );
//!
//! let enrichment = client.enrich(&Symbol::parse("aapl")?).await;
//! if let Some(price) = enrichment.quote.current_price {
//!     println!("AAPL ${price:.2}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure policy
//!
//! Enrichment is best effort. A missing token, an upstream error status, a
//! transport failure or a malformed body all yield an empty
//! [`QuoteData`]/[`ProfileData`]; nothing is propagated to the caller.

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod market_data;

pub use cache::{CacheMode, CacheStore};
pub use config::MarketDataConfig;
pub use domain::{Enrichment, ProfileData, QuoteData, Symbol, UtcDateTime};
pub use error::ValidationError;
pub use http_client::{
    HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient,
};
pub use market_data::{MarketDataClient, MarketDataError};
