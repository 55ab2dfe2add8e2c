//! Watchlist page view model.
//!
//! [`render_watchlist`] decides which of the three views applies and, for
//! the card view, enriches every entry with live market data. Enrichment
//! is best effort: a card with no data shows "Price data unavailable"
//! and the stored company name.

use std::fmt::Write as _;

use futures::future::join_all;
use serde::Serialize;
use tickwatch_core::{Enrichment, MarketDataClient, Symbol, UtcDateTime};
use tickwatch_store::WatchlistEntry;

use crate::backend::WatchlistBackend;
use crate::session::Session;

pub const SIGN_IN_HREF: &str = "/sign-in";
pub const EXPLORE_HREF: &str = "/";
pub const PRICE_UNAVAILABLE: &str = "Price data unavailable";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum WatchlistPage {
    SignInPrompt {
        title: String,
        message: String,
        sign_in_href: String,
    },
    Empty {
        title: String,
        message: String,
        explore_href: String,
    },
    Cards {
        title: String,
        subtitle: String,
        cards: Vec<WatchlistCard>,
    },
}

/// One enriched watchlist entry, with display strings already formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistCard {
    pub symbol: Symbol,
    /// Profile name when available, else the stored company.
    pub company_name: String,
    pub company: String,
    pub added_at: UtcDateTime,
    pub price: Option<f64>,
    pub percent_change: Option<f64>,
    /// In millions, as reported upstream.
    pub market_cap: Option<f64>,
    pub is_positive: bool,
    pub price_display: String,
    pub change_display: Option<String>,
    pub market_cap_display: Option<String>,
    pub added_display: String,
    pub detail_href: String,
    pub in_watchlist: bool,
}

impl WatchlistCard {
    pub fn new(entry: WatchlistEntry, enrichment: Enrichment) -> Self {
        let Enrichment { quote, profile } = enrichment;
        let company_name = profile
            .display_name()
            .map(str::to_owned)
            .unwrap_or_else(|| entry.company.clone());
        let is_positive = quote.percent_change.unwrap_or(0.0) >= 0.0;

        Self {
            detail_href: entry.symbol.detail_href(),
            company_name,
            price_display: quote
                .current_price
                .map(format_price)
                .unwrap_or_else(|| PRICE_UNAVAILABLE.to_owned()),
            change_display: quote.percent_change.map(format_percent_change),
            market_cap_display: profile.market_capitalization.map(format_market_cap),
            added_display: entry.added_at.format_date(),
            price: quote.current_price,
            percent_change: quote.percent_change,
            market_cap: profile.market_capitalization,
            is_positive,
            symbol: entry.symbol,
            company: entry.company,
            added_at: entry.added_at,
            in_watchlist: true,
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

pub fn format_percent_change(percent: f64) -> String {
    let percent = if percent == 0.0 { 0.0 } else { percent };
    let sign = if percent >= 0.0 { "+" } else { "" };
    format!("{sign}{percent:.2}%")
}

/// Market cap arrives in millions; shown in billions.
pub fn format_market_cap(millions: f64) -> String {
    format!("${:.2}B", millions / 1000.0)
}

/// Build the watchlist page for `session`.
///
/// Without a session nothing is loaded. An empty watchlist never touches
/// market data. Otherwise all entries are enriched concurrently and the
/// cards keep the watchlist order.
pub async fn render_watchlist(
    session: Option<&Session>,
    backend: &dyn WatchlistBackend,
    market: &MarketDataClient,
) -> WatchlistPage {
    let Some(session) = session else {
        return WatchlistPage::sign_in_prompt();
    };

    let entries = match backend.list(&session.email).await {
        Ok(entries) => entries,
        Err(error) => {
            tracing::error!(email = %session.email, error = %error, "failed to load watchlist for page");
            Vec::new()
        }
    };

    if entries.is_empty() {
        return WatchlistPage::empty();
    }

    let cards = join_all(entries.into_iter().map(|entry| async move {
        let enrichment = market.enrich(&entry.symbol).await;
        WatchlistCard::new(entry, enrichment)
    }))
    .await;

    tracing::debug!(email = %session.email, cards = cards.len(), "rendered watchlist");
    WatchlistPage::Cards {
        title: "My Watchlist".to_owned(),
        subtitle: "Track your favorite stocks and monitor their performance".to_owned(),
        cards,
    }
}

impl WatchlistPage {
    pub fn sign_in_prompt() -> Self {
        Self::SignInPrompt {
            title: "Watchlist".to_owned(),
            message: "Please sign in to view your watchlist".to_owned(),
            sign_in_href: SIGN_IN_HREF.to_owned(),
        }
    }

    pub fn empty() -> Self {
        Self::Empty {
            title: "Your Watchlist is Empty".to_owned(),
            message: "Start building your watchlist by searching for stocks and adding them \
                      to keep track of your favorite companies."
                .to_owned(),
            explore_href: EXPLORE_HREF.to_owned(),
        }
    }

    pub fn cards(&self) -> &[WatchlistCard] {
        match self {
            Self::Cards { cards, .. } => cards,
            _ => &[],
        }
    }

    /// Plain-text rendering for terminals.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        match self {
            Self::SignInPrompt {
                title,
                message,
                sign_in_href,
            } => {
                let _ = writeln!(out, "{title}");
                let _ = writeln!(out, "{message}");
                let _ = writeln!(out, "Sign In: {sign_in_href}");
            }
            Self::Empty {
                title,
                message,
                explore_href,
            } => {
                let _ = writeln!(out, "{title}");
                let _ = writeln!(out, "{message}");
                let _ = writeln!(out, "Explore Stocks: {explore_href}");
            }
            Self::Cards {
                title,
                subtitle,
                cards,
            } => {
                let _ = writeln!(out, "{title}");
                let _ = writeln!(out, "{subtitle}");
                for card in cards {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "{}  {}", card.symbol, card.company_name);
                    match &card.change_display {
                        Some(change) => {
                            let _ = writeln!(out, "  {}  {change}", card.price_display);
                        }
                        None => {
                            let _ = writeln!(out, "  {}", card.price_display);
                        }
                    }
                    if let Some(market_cap) = &card.market_cap_display {
                        let _ = writeln!(out, "  Market Cap  {market_cap}");
                    }
                    let _ = writeln!(out, "  Added       {}", card.added_display);
                    let _ = writeln!(out, "  {}", card.detail_href);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tickwatch_core::{ProfileData, QuoteData};

    fn entry(symbol: &str, company: &str) -> WatchlistEntry {
        WatchlistEntry {
            user_id: "user-1".to_owned(),
            symbol: Symbol::parse(symbol).expect("symbol"),
            company: company.to_owned(),
            added_at: UtcDateTime::parse("2024-03-05T14:00:00Z").expect("ts"),
        }
    }

    #[test]
    fn display_strings_follow_upstream_units() {
        assert_eq!(format_price(123.456), "$123.46");
        assert_eq!(format_percent_change(1.234), "+1.23%");
        assert_eq!(format_percent_change(-0.5126), "-0.51%");
        assert_eq!(format_percent_change(-0.0), "+0.00%");
        assert_eq!(format_market_cap(2_500.0), "$2.50B");
        assert_eq!(format_market_cap(2_870_000.0), "$2870.00B");
    }

    #[test]
    fn enriched_card_prefers_profile_name() {
        let enrichment = Enrichment {
            quote: QuoteData {
                current_price: Some(189.84),
                percent_change: Some(-0.51),
                ..QuoteData::default()
            },
            profile: ProfileData {
                name: Some("Apple Inc".to_owned()),
                market_capitalization: Some(2_950_000.0),
                ..ProfileData::default()
            },
        };

        let card = WatchlistCard::new(entry("AAPL", "Apple"), enrichment);

        assert_eq!(card.company_name, "Apple Inc");
        assert_eq!(card.company, "Apple");
        assert_eq!(card.price_display, "$189.84");
        assert_eq!(card.change_display.as_deref(), Some("-0.51%"));
        assert_eq!(card.market_cap_display.as_deref(), Some("$2950.00B"));
        assert_eq!(card.added_display, "2024-03-05");
        assert_eq!(card.detail_href, "/stocks/AAPL");
        assert!(!card.is_positive);
        assert!(card.in_watchlist);
    }

    #[test]
    fn empty_enrichment_degrades_to_stored_values() {
        let card = WatchlistCard::new(entry("MSFT", "Microsoft"), Enrichment::default());

        assert_eq!(card.company_name, "Microsoft");
        assert_eq!(card.price_display, PRICE_UNAVAILABLE);
        assert_eq!(card.change_display, None);
        assert_eq!(card.market_cap_display, None);
        assert!(card.is_positive);
    }

    #[test]
    fn blank_profile_name_falls_back_to_company() {
        let enrichment = Enrichment {
            profile: ProfileData {
                name: Some("  ".to_owned()),
                ..ProfileData::default()
            },
            ..Enrichment::default()
        };

        let card = WatchlistCard::new(entry("MSFT", "Microsoft"), enrichment);
        assert_eq!(card.company_name, "Microsoft");
    }

    #[test]
    fn text_rendering_lists_cards() {
        let page = WatchlistPage::Cards {
            title: "My Watchlist".to_owned(),
            subtitle: "Track".to_owned(),
            cards: vec![WatchlistCard::new(entry("MSFT", "Microsoft"), Enrichment::default())],
        };

        let text = page.to_text();
        assert!(text.contains("MSFT  Microsoft"));
        assert!(text.contains(PRICE_UNAVAILABLE));
        assert!(text.contains("/stocks/MSFT"));
        assert!(WatchlistPage::sign_in_prompt().to_text().contains("/sign-in"));
    }
}
