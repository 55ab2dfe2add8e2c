use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tickwatch_core::Symbol;
use tickwatch_store::{MutationOutcome, WatchlistEntry};

use crate::error::AppError;
use crate::render::{render_watchlist, WatchlistPage};
use crate::state::{AppState, SignedIn};

#[derive(Debug, Deserialize)]
pub struct AddRequest {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub company: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn watchlist_page(State(state): State<AppState>, headers: HeaderMap) -> Json<WatchlistPage> {
    let session = state.sessions.get_session(&headers);
    let page = render_watchlist(session.as_ref(), state.backend.as_ref(), &state.market).await;
    Json(page)
}

pub async fn list_entries(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
) -> Result<Json<Vec<WatchlistEntry>>, AppError> {
    let entries = state.backend.list(&session.email).await?;
    Ok(Json(entries))
}

pub async fn list_symbols(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
) -> Result<Json<Vec<Symbol>>, AppError> {
    let symbols = state.backend.symbols(&session.email).await?;
    Ok(Json(symbols))
}

pub async fn add_entry(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    body: Result<Json<AddRequest>, JsonRejection>,
) -> Result<Json<MutationOutcome>, AppError> {
    let Json(request) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let outcome = state
        .backend
        .add(&session.email, &request.symbol, &request.company)
        .await?;
    Ok(Json(outcome))
}

pub async fn remove_entry(
    State(state): State<AppState>,
    SignedIn(session): SignedIn,
    Path(symbol): Path<String>,
) -> Result<Json<MutationOutcome>, AppError> {
    let outcome = state.backend.remove(&session.email, &symbol).await?;
    Ok(Json(outcome))
}
