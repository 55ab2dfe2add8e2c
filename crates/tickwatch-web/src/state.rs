use std::sync::Arc;

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tickwatch_core::MarketDataClient;

use crate::backend::WatchlistBackend;
use crate::error::AppError;
use crate::session::{Session, SessionProvider};

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn WatchlistBackend>,
    pub market: MarketDataClient,
    pub sessions: Arc<dyn SessionProvider>,
}

impl AppState {
    pub fn new(
        backend: Arc<dyn WatchlistBackend>,
        market: MarketDataClient,
        sessions: Arc<dyn SessionProvider>,
    ) -> Self {
        Self {
            backend,
            market,
            sessions,
        }
    }
}

/// Extracts the signed-in user or rejects with 401.
pub struct SignedIn(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for SignedIn {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state
            .sessions
            .get_session(&parts.headers)
            .map(SignedIn)
            .ok_or_else(|| AppError::Unauthorized("Please sign in to use watchlist".to_owned()))
    }
}
