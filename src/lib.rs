pub mod config;
pub mod job;
pub mod log;
pub mod providers;
pub mod rate_provider;
pub mod store;

use anyhow::Result;
use tracing::{debug, info};

pub use job::JobSummary;

/// Load configuration, wire up the provider and the store, and run one sync.
pub async fn run(config_path: Option<&str>) -> Result<JobSummary> {
    info!("Rate sync starting...");

    let config = match config_path {
        Some(path) => config::AppConfig::load_from_path(path)?,
        None => config::AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider = providers::xe::XeProvider::new(&config.provider.base_url)?;

    let store = store::postgres::PgRateStore::connect(&config.database.url).await?;
    store.ensure_schema().await?;

    job::run_sync(&config.currency, &provider, &store).await
}
