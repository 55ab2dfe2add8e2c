use std::sync::Arc;

use tickwatch_core::{HttpClient, MarketDataClient, MarketDataConfig, NoopHttpClient, ReqwestHttpClient};
use tickwatch_store::Store;
use tickwatch_web::{render_watchlist, Session};

use crate::cli::ShowArgs;
use crate::error::CliError;

use super::CommandResult;

pub async fn run(args: &ShowArgs, store: &Store) -> Result<CommandResult, CliError> {
    let http_client: Arc<dyn HttpClient> = if args.offline {
        Arc::new(NoopHttpClient)
    } else {
        Arc::new(ReqwestHttpClient::new())
    };
    let market = MarketDataClient::new(MarketDataConfig::from_env(), http_client);

    let session = args.email.clone().and_then(Session::new);
    let backend = store.watchlist();
    let page = render_watchlist(session.as_ref(), &backend, &market).await;

    if args.text {
        Ok(CommandResult::text(page.to_text()))
    } else {
        CommandResult::json(&page)
    }
}
