use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::rate_provider::RatePayload;
use crate::store::RateStore;

use anyhow::Result;

/// What the table holds for one currency pair.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRate {
    pub rate: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// In-memory rate store backed by a HashMap, for tests and dry runs.
///
/// Mirrors the relational upsert contract: one entry per (from, to) pair,
/// updates touch `rate` and `updated_at` only.
pub struct MemoryRateStore {
    rows: Mutex<HashMap<(String, String), StoredRate>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(HashMap::new()),
        }
    }

    pub async fn get(&self, from: &str, to: &str) -> Option<StoredRate> {
        let rows = self.rows.lock().await;
        rows.get(&(from.to_string(), to.to_string())).cloned()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

impl Default for MemoryRateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn upsert_rates(&self, payload: &RatePayload) -> Result<u64> {
        let mut rows = self.rows.lock().await;
        for quote in &payload.to {
            let key = (payload.from.clone(), quote.quote_currency.clone());
            rows.entry(key)
                .and_modify(|row| {
                    row.rate = quote.mid;
                    row.updated_at = payload.timestamp;
                })
                .or_insert(StoredRate {
                    rate: quote.mid,
                    created_at: payload.timestamp,
                    updated_at: payload.timestamp,
                });
        }
        debug!(
            "Upserted {} pairs for base {} in memory",
            payload.to.len(),
            payload.from
        );
        Ok(payload.to.len() as u64)
    }
}
