//! Presence reconciliation
//!
//! Merges one snapshot of active devices into the interval history:
//! a device whose latest interval ended within the recency window gets that
//! interval extended to `now`, anything else opens a new interval.
//! Intervals are never split, closed or deleted.

use chrono::{DateTime, Duration, Utc};

use crate::db::DeviceHistoryStore;
use crate::error::AppError;
use crate::models::ActiveDevice;

/// Gap between polls still treated as continuous presence
pub const RECENCY_WINDOW_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub inserted: usize,
    pub extended: usize,
}

/// Oldest `ending` that still counts as open (exclusive)
pub fn recency_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::minutes(RECENCY_WINDOW_MINUTES)
}

/// Reconcile `devices` in order, one read-then-write per device.
///
/// The first store failure aborts; devices already handled stay written.
pub async fn reconcile<S>(
    now: DateTime<Utc>,
    devices: &[ActiveDevice],
    store: &S,
) -> Result<ReconcileSummary, AppError>
where
    S: DeviceHistoryStore + ?Sized,
{
    let cutoff = recency_cutoff(now);
    let mut summary = ReconcileSummary::default();

    for device in devices {
        match store.find_open_interval(device, cutoff).await? {
            Some(id) => {
                store.extend_interval(id, now).await?;
                summary.extended += 1;
                tracing::debug!("[Reconcile] Extended #{} {} ({})", id, device.name, device.mac);
            }
            None => {
                let id = store.open_interval(device, now).await?;
                summary.inserted += 1;
                tracing::debug!("[Reconcile] Opened #{} {} ({})", id, device.name, device.mac);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::ActiveDeviceRecord;
    use chrono::TimeZone;
    use tokio_test::{assert_err, assert_ok};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn device(name: &str, mac: &str) -> ActiveDevice {
        ActiveDevice {
            name: name.to_string(),
            ip: "192.168.0.10".to_string(),
            mac: mac.to_string(),
            net: "802.11".to_string(),
            net_number: 6,
        }
    }

    fn record(id: i64, d: &ActiveDevice, starting: DateTime<Utc>, ending: DateTime<Utc>) -> ActiveDeviceRecord {
        ActiveDeviceRecord {
            active_device_id: id,
            name: d.name.clone(),
            ip: d.ip.clone(),
            mac: d.mac.clone(),
            net: d.net.clone(),
            net_number: d.net_number,
            starting,
            ending,
        }
    }

    #[tokio::test]
    async fn test_recent_interval_extended() {
        let x = device("X", "aa:aa:aa:aa:aa:aa");
        let start = now() - Duration::hours(2);
        let store = MemoryStore::with_rows(vec![record(1, &x, start, now() - Duration::minutes(10))]);

        let summary = assert_ok!(reconcile(now(), &[x.clone()], &store).await);

        assert_eq!(summary, ReconcileSummary { inserted: 0, extended: 1 });
        let rows = store.rows_for(&x);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].starting, start);
        assert_eq!(rows[0].ending, now());
    }

    #[tokio::test]
    async fn test_unknown_device_inserted() {
        let y = device("Y", "bb:bb:bb:bb:bb:bb");
        let store = MemoryStore::default();

        let summary = assert_ok!(reconcile(now(), &[y.clone()], &store).await);

        assert_eq!(summary, ReconcileSummary { inserted: 1, extended: 0 });
        let rows = store.rows_for(&y);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].starting, now());
        assert_eq!(rows[0].ending, now());
    }

    #[tokio::test]
    async fn test_stale_interval_opens_new_one() {
        let y = device("Y", "bb:bb:bb:bb:bb:bb");
        let old_end = now() - Duration::minutes(45);
        let store = MemoryStore::with_rows(vec![record(1, &y, old_end - Duration::hours(1), old_end)]);

        assert_ok!(reconcile(now(), &[y.clone()], &store).await);

        let rows = store.rows_for(&y);
        assert_eq!(rows.len(), 2);
        // old interval untouched
        assert_eq!(rows[0].ending, old_end);
        assert_eq!(rows[1].starting, now());
    }

    #[tokio::test]
    async fn test_cutoff_boundary_is_stale() {
        let x = device("X", "aa:aa:aa:aa:aa:aa");
        let boundary = now() - Duration::minutes(30);
        let store = MemoryStore::with_rows(vec![record(1, &x, boundary, boundary)]);

        let summary = assert_ok!(reconcile(now(), &[x.clone()], &store).await);

        assert_eq!(summary.inserted, 1);
        assert_eq!(store.rows_for(&x).len(), 2);
    }

    #[tokio::test]
    async fn test_identity_requires_all_fields() {
        let x = device("X", "aa:aa:aa:aa:aa:aa");
        let mut moved = x.clone();
        moved.ip = "192.168.0.99".to_string();
        let store = MemoryStore::with_rows(vec![record(
            1,
            &x,
            now() - Duration::hours(1),
            now() - Duration::minutes(5),
        )]);

        let summary = assert_ok!(reconcile(now(), &[moved.clone()], &store).await);

        assert_eq!(summary.inserted, 1);
        assert_eq!(store.rows_for(&x)[0].ending, now() - Duration::minutes(5));
    }

    #[tokio::test]
    async fn test_duplicate_in_snapshot_extends_fresh_interval() {
        let x = device("X", "aa:aa:aa:aa:aa:aa");
        let store = MemoryStore::default();

        let summary = assert_ok!(reconcile(now(), &[x.clone(), x.clone()], &store).await);

        assert_eq!(summary, ReconcileSummary { inserted: 1, extended: 1 });
        assert_eq!(store.rows_for(&x).len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_earlier_writes() {
        let a = device("A", "aa:aa:aa:aa:aa:aa");
        let b = device("B", "bb:bb:bb:bb:bb:bb");
        let c = device("C", "cc:cc:cc:cc:cc:cc");
        let store = MemoryStore::default().failing_at(1);

        let err = assert_err!(reconcile(now(), &[a.clone(), b.clone(), c.clone()], &store).await);

        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.rows_for(&a).len(), 1);
        assert!(store.rows_for(&b).is_empty());
        assert!(store.rows_for(&c).is_empty());
    }

    #[tokio::test]
    async fn test_ending_never_moves_back() {
        let x = device("X", "aa:aa:aa:aa:aa:aa");
        let store = MemoryStore::with_rows(vec![record(1, &x, now(), now())]);
        let earlier = now() - Duration::minutes(1);

        assert_ok!(reconcile(earlier, &[x.clone()], &store).await);

        assert_eq!(store.rows()[0].ending, now());
    }
}
