pub mod memory;
pub mod postgres;
pub mod statement;

use anyhow::Result;
use async_trait::async_trait;

use crate::rate_provider::RatePayload;

/// Store seam for persisting rate payloads.
///
/// One call upserts every pair in the payload and reports rows affected.
/// Implementations rely on the store's own concurrency control; callers may
/// upsert from many tasks at once.
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn upsert_rates(&self, payload: &RatePayload) -> Result<u64>;
}
