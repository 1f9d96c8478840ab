//! router.active_device table: one row per observed-presence interval

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::PgDb;
use crate::db::DeviceHistoryStore;
use crate::error::AppError;
use crate::models::{ActiveDevice, ActiveDeviceRecord};

impl PgDb {
    /// Create schema, table and lookup index if missing
    pub async fn ensure_active_device_table(&self) -> Result<(), AppError> {
        sqlx::query("CREATE SCHEMA IF NOT EXISTS router")
            .execute(self.pool())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS router.active_device (
                active_device_id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                ip TEXT NOT NULL,
                mac TEXT NOT NULL,
                net TEXT NOT NULL,
                net_number INT NOT NULL,
                starting TIMESTAMPTZ NOT NULL,
                ending TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(self.pool())
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_active_device_identity
            ON router.active_device (mac, ip, name, net, net_number, ending)
            "#,
        )
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// Recorded intervals for a MAC address, newest first
    pub async fn list_intervals_by_mac(
        &self,
        mac: &str,
        limit: u32,
    ) -> Result<Vec<ActiveDeviceRecord>, AppError> {
        let rows = sqlx::query_as::<_, ActiveDeviceRecord>(
            r#"
            SELECT active_device_id, name, ip, mac, net, net_number, starting, ending
            FROM router.active_device
            WHERE lower(mac) = lower($1)
            ORDER BY ending DESC
            LIMIT $2
            "#,
        )
        .bind(mac)
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl DeviceHistoryStore for PgDb {
    async fn find_open_interval(
        &self,
        device: &ActiveDevice,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT active_device_id
            FROM router.active_device
            WHERE ending > $1
                AND name = $2 AND ip = $3 AND mac = $4
                AND net = $5 AND net_number = $6
            ORDER BY ending DESC
            LIMIT 1
            "#,
        )
        .bind(cutoff)
        .bind(&device.name)
        .bind(&device.ip)
        .bind(&device.mac)
        .bind(&device.net)
        .bind(device.net_number)
        .fetch_optional(self.pool())
        .await?;

        Ok(id)
    }

    async fn extend_interval(&self, id: i64, ending: DateTime<Utc>) -> Result<(), AppError> {
        // GREATEST keeps ending monotonic if an older clock ever writes
        sqlx::query(
            r#"
            UPDATE router.active_device
            SET ending = GREATEST(ending, $1)
            WHERE active_device_id = $2
            "#,
        )
        .bind(ending)
        .bind(id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    async fn open_interval(&self, device: &ActiveDevice, at: DateTime<Utc>) -> Result<i64, AppError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO router.active_device (name, ip, mac, net, net_number, starting, ending)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING active_device_id
            "#,
        )
        .bind(&device.name)
        .bind(&device.ip)
        .bind(&device.mac)
        .bind(&device.net)
        .bind(device.net_number)
        .bind(at)
        .fetch_one(self.pool())
        .await?;

        Ok(id)
    }
}
