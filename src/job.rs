//! The fan-out sync job: one concurrent unit per configured currency.

use anyhow::{Result, bail};
use futures::future::join_all;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::rate_provider::{ProviderError, RateProvider};
use crate::store::RateStore;

/// Outcome of one job run.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub elapsed: Duration,
    pub attempted: usize,
    pub succeeded: usize,
}

impl JobSummary {
    pub fn failed(&self) -> usize {
        self.attempted - self.succeeded
    }
}

/// Fetch and upsert rates for every configured currency.
///
/// Each currency gets its own unit of work, all launched eagerly and joined
/// before returning. A unit that fails at any stage logs the failure and
/// stops; siblings are unaffected and the job itself only errors on an empty
/// currency list.
pub async fn run_sync(
    currencies: &[String],
    provider: &dyn RateProvider,
    store: &dyn RateStore,
) -> Result<JobSummary> {
    if currencies.is_empty() {
        bail!("No currencies configured, nothing to sync");
    }

    let start = Instant::now();
    info!(currencies = ?currencies, "Starting rate sync");

    // Every request quotes against the full configured list, base included.
    let quote_list = currencies.join(",");

    let units = currencies
        .iter()
        .map(|base| sync_currency(base, &quote_list, provider, store));
    let outcomes = join_all(units).await;

    let summary = JobSummary {
        elapsed: start.elapsed(),
        attempted: outcomes.len(),
        succeeded: outcomes.into_iter().filter(|ok| *ok).count(),
    };

    info!(
        elapsed = ?summary.elapsed,
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        "Rate sync finished"
    );

    Ok(summary)
}

async fn sync_currency(
    base: &str,
    quote_list: &str,
    provider: &dyn RateProvider,
    store: &dyn RateStore,
) -> bool {
    debug!(base, "Fetching rates");

    let payload = match provider.fetch_rates(base, quote_list).await {
        Ok(payload) => payload,
        Err(ProviderError::Api(message)) => {
            error!(base, message = %message, "Rate API returned an error");
            return false;
        }
        Err(err @ ProviderError::Transport(_)) => {
            warn!(base, error = %err, "Could not reach the rate API");
            return false;
        }
        Err(err) => {
            error!(base, error = %err, "Could not read the rate response");
            return false;
        }
    };

    match store.upsert_rates(&payload).await {
        Ok(rows_affected) => {
            info!(base, rows_affected, "Exchange rates updated");
            true
        }
        Err(err) => {
            error!(base, error = %err, "Rate upsert failed");
            false
        }
    }
}
