//! PostgreSQL rate store.
//!
//! Concurrent upserts from sibling sync tasks share one pool; row locking
//! plus the conflict clause keep pairs consistent without application-level
//! coordination.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{debug, info};

use crate::rate_provider::RatePayload;
use crate::store::RateStore;
use crate::store::statement::{BindValue, PlaceholderStyle, build_upsert};

pub struct PgRateStore {
    pool: PgPool,
}

impl PgRateStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to PostgreSQL")?;

        info!("PostgreSQL connection pool initialized");
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the `exchange_rates` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exchange_rates (
                from_currency TEXT NOT NULL,
                to_currency TEXT NOT NULL,
                rate NUMERIC NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (from_currency, to_currency)
            )
            ",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create exchange_rates table")?;
        Ok(())
    }
}

#[async_trait]
impl RateStore for PgRateStore {
    async fn upsert_rates(&self, payload: &RatePayload) -> Result<u64> {
        let statement = build_upsert(payload, PlaceholderStyle::Numbered)?;
        debug!(
            "Executing upsert of {} pairs for base {}",
            payload.to.len(),
            payload.from
        );

        let mut query = sqlx::query(&statement.sql);
        for bind in &statement.binds {
            query = match bind {
                BindValue::Currency(code) => query.bind(code),
                BindValue::Rate(rate) => query.bind(rate),
                BindValue::Timestamp(instant) => query.bind(instant),
            };
        }

        let result = query
            .execute(&self.pool)
            .await
            .with_context(|| format!("Rate upsert failed for base {}", payload.from))?;

        Ok(result.rows_affected())
    }
}
