//! In-memory history store for tests

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DeviceHistoryStore;
use crate::error::AppError;
use crate::models::{ActiveDevice, ActiveDeviceRecord};

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<ActiveDeviceRecord>>,
    /// Fail the n-th write (0 based) with a database error
    fail_write_at: Option<usize>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn with_rows(rows: Vec<ActiveDeviceRecord>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub fn failing_at(mut self, write: usize) -> Self {
        self.fail_write_at = Some(write);
        self
    }

    pub fn rows(&self) -> Vec<ActiveDeviceRecord> {
        self.rows.lock().unwrap().clone()
    }

    pub fn rows_for(&self, device: &ActiveDevice) -> Vec<ActiveDeviceRecord> {
        self.rows().into_iter().filter(|r| same_identity(r, device)).collect()
    }

    fn count_write(&self) -> Result<(), AppError> {
        let mut writes = self.writes.lock().unwrap();
        let n = *writes;
        *writes += 1;
        if self.fail_write_at == Some(n) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceHistoryStore for MemoryStore {
    async fn find_open_interval(
        &self,
        device: &ActiveDevice,
        cutoff: DateTime<Utc>,
    ) -> Result<Option<i64>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| same_identity(r, device) && r.ending > cutoff)
            .max_by_key(|r| r.ending)
            .map(|r| r.active_device_id))
    }

    async fn extend_interval(&self, id: i64, ending: DateTime<Utc>) -> Result<(), AppError> {
        self.count_write()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|r| r.active_device_id == id) {
            row.ending = row.ending.max(ending);
        }
        Ok(())
    }

    async fn open_interval(&self, device: &ActiveDevice, at: DateTime<Utc>) -> Result<i64, AppError> {
        self.count_write()?;
        let mut rows = self.rows.lock().unwrap();
        let id = rows.iter().map(|r| r.active_device_id).max().unwrap_or(0) + 1;
        rows.push(ActiveDeviceRecord {
            active_device_id: id,
            name: device.name.clone(),
            ip: device.ip.clone(),
            mac: device.mac.clone(),
            net: device.net.clone(),
            net_number: device.net_number,
            starting: at,
            ending: at,
        });
        Ok(id)
    }
}

fn same_identity(row: &ActiveDeviceRecord, device: &ActiveDevice) -> bool {
    row.name == device.name
        && row.ip == device.ip
        && row.mac == device.mac
        && row.net == device.net
        && row.net_number == device.net_number
}
