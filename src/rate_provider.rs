//! Provider seam for fetching exchange rates for the application.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

/// One quote currency and its mid-market rate against the base.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRate {
    pub quote_currency: String,
    pub mid: Decimal,
}

/// A validated rate response for one base currency.
///
/// `from` and `to` are guaranteed non-empty; a body that decodes with either
/// field empty is rejected by the parser, never handed out as a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RatePayload {
    pub from: String,
    pub to: Vec<QuoteRate>,
    pub timestamp: DateTime<Utc>,
}

/// Failures on the fetch/parse path, per stage.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("rate API rejected the request: {0}")]
    Api(String),
    #[error("response has no base currency or quote rates")]
    Invalid,
}

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch rates for `base` against the comma-joined `quotes` list.
    async fn fetch_rates(&self, base: &str, quotes: &str) -> Result<RatePayload, ProviderError>;
}
