//! Database module - presence history storage

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::ActiveDevice;

pub use self::postgres::PgDb;

/// Storage for observed-presence intervals.
///
/// Each call is its own read or write; nothing spans the whole batch.
#[async_trait]
pub trait DeviceHistoryStore: Send + Sync {
    /// Id of the most recent interval of `device` whose `ending > cutoff`
    async fn find_open_interval(
        &self,
        device: &ActiveDevice,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<i64>, AppError>;

    /// Move `ending` of an interval forward to `ending`
    async fn extend_interval(&self, id: i64, ending: DateTime<Utc>) -> Result<(), AppError>;

    /// Open a new interval with `starting = ending = at`
    async fn open_interval(&self, device: &ActiveDevice, at: DateTime<Utc>) -> Result<i64, AppError>;
}
