use std::sync::Arc;
use std::time::Duration;

use tickwatch_core::{MarketDataClient, MarketDataConfig, ReqwestHttpClient};
use tickwatch_store::Store;
use tickwatch_web::{AppState, HeaderSessionProvider, WebConfig};

use crate::cli::ServeArgs;
use crate::error::CliError;

use super::CommandResult;

const CACHE_PURGE_INTERVAL: Duration = Duration::from_secs(300);

pub async fn run(args: &ServeArgs, store: &Store) -> Result<CommandResult, CliError> {
    let mut config = WebConfig::from_env();
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(header) = &args.session_header {
        config.session_header = header.clone();
    }

    let market_config = MarketDataConfig::from_env();
    if !market_config.has_token() {
        tracing::warn!("no market data token configured; cards will show stored values only");
    }

    let state = AppState::new(
        Arc::new(store.watchlist()),
        MarketDataClient::new(market_config, Arc::new(ReqwestHttpClient::new())),
        Arc::new(HeaderSessionProvider::new(config.session_header.clone())),
    );

    let cache = state.market.cache().clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(CACHE_PURGE_INTERVAL);
        loop {
            ticker.tick().await;
            let purged = cache.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "purged expired market-data responses");
            }
        }
    });

    tracing::info!(
        db_path = %store.config().db_path.display(),
        session_header = %config.session_header,
        "starting watchlist server"
    );
    tickwatch_web::serve(&config, state).await?;
    Ok(CommandResult::empty())
}
