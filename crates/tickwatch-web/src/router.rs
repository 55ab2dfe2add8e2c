use axum::{
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::WebConfig;
use crate::handlers;
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/watchlist",
            get(handlers::list_entries).post(handlers::add_entry),
        )
        .route("/watchlist/symbols", get(handlers::list_symbols))
        .route("/watchlist/:symbol", delete(handlers::remove_entry));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/watchlist", get(handlers::watchlist_page))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: &WebConfig, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "watchlist server listening");

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutting down");
            }
        })
        .await
}
