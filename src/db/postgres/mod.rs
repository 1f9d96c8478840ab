//! PostgreSQL database module

mod active_device;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::error::AppError;

/// PostgreSQL database wrapper
#[derive(Clone)]
pub struct PgDb {
    pool: PgPool,
}

impl PgDb {
    /// Connect to PostgreSQL. A poll is sequential, one connection is enough.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        tracing::info!("[Db] Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .min_connections(0)
            .connect(url)
            .await?;

        tracing::info!("[Db] PostgreSQL connected successfully");

        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Release the connection
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("[Db] Connection closed");
    }
}
