use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::rate_provider::{ProviderError, QuoteRate, RatePayload, RateProvider};

/// Fetches mid-market rates from an XE-style `convert_from` endpoint.
pub struct XeProvider {
    base_url: String,
    client: reqwest::Client,
}

impl XeProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .user_agent("ratesync/1.0")
            .build()?;
        Ok(XeProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn fetch_raw(&self, base: &str, quotes: &str) -> Result<Vec<u8>, ProviderError> {
        let url = format!("{}/v1/convert_from", self.base_url);
        debug!("Requesting rates from {} for base {}", url, base);

        let response = self
            .client
            .get(&url)
            .query(&[("from", base), ("to", quotes), ("amount", "1")])
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?.to_vec())
    }
}

// The API signals failures in the body, not the status line: an error body
// still decodes as XeRateResponse, just with empty fields.
#[derive(Debug, Deserialize)]
struct XeRateResponse {
    #[serde(default)]
    from: String,
    #[serde(default)]
    to: Vec<XeQuote>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct XeQuote {
    quotecurrency: String,
    mid: Decimal,
}

#[derive(Debug, Deserialize)]
struct XeErrorResponse {
    #[serde(default)]
    message: String,
}

/// Decode a response body into a validated payload.
///
/// Tries the rate shape first; a structurally sound body with an empty
/// `from` or `to` is re-read as the error shape so the API's own message
/// survives into the error. A body that fits neither shape is malformed.
pub fn parse_rate_response(body: &[u8]) -> Result<RatePayload, ProviderError> {
    let raw: XeRateResponse = serde_json::from_slice(body)?;

    if raw.from.is_empty() || raw.to.is_empty() {
        let api_error: XeErrorResponse = serde_json::from_slice(body)?;
        if api_error.message.is_empty() {
            return Err(ProviderError::Invalid);
        }
        return Err(ProviderError::Api(api_error.message));
    }

    let timestamp = raw.timestamp.ok_or(ProviderError::Invalid)?;

    Ok(RatePayload {
        from: raw.from,
        to: raw
            .to
            .into_iter()
            .map(|quote| QuoteRate {
                quote_currency: quote.quotecurrency,
                mid: quote.mid,
            })
            .collect(),
        timestamp,
    })
}

#[async_trait]
impl RateProvider for XeProvider {
    async fn fetch_rates(&self, base: &str, quotes: &str) -> Result<RatePayload, ProviderError> {
        let body = self.fetch_raw(base, quotes).await?;
        debug!("Received {} byte rate response for {}", body.len(), base);
        parse_rate_response(&body)
    }
}
