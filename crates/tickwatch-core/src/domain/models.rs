use serde::{Deserialize, Serialize};

/// Latest quote as returned by the market-data `quote` endpoint.
///
/// Every field is optional: upstream omits fields for unknown symbols and
/// a failed fetch yields `QuoteData::default()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    /// Current price.
    #[serde(rename = "c", default, skip_serializing_if = "Option::is_none")]
    pub current_price: Option<f64>,
    /// Absolute change since previous close.
    #[serde(rename = "d", default, skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Percent change since previous close.
    #[serde(rename = "dp", default, skip_serializing_if = "Option::is_none")]
    pub percent_change: Option<f64>,
    #[serde(rename = "h", default, skip_serializing_if = "Option::is_none")]
    pub high: Option<f64>,
    #[serde(rename = "l", default, skip_serializing_if = "Option::is_none")]
    pub low: Option<f64>,
    #[serde(rename = "o", default, skip_serializing_if = "Option::is_none")]
    pub open: Option<f64>,
    #[serde(rename = "pc", default, skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<f64>,
    /// Unix seconds of the last trade.
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl QuoteData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Company profile as returned by the market-data `stock/profile2` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ticker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exchange: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipo: Option<String>,
    /// Market capitalization in millions of `currency`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_capitalization: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_outstanding: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weburl: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finnhub_industry: Option<String>,
}

impl ProfileData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Company name, ignoring blank values.
    pub fn display_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Quote and profile fetched together for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Enrichment {
    pub quote: QuoteData,
    pub profile: ProfileData,
}
