//! One poll run: router snapshot → presence history
//!
//! decrypt → login → fetch → parse → reconcile each device in order.
//! Strictly sequential; the first failure ends the run.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::db::{DeviceHistoryStore, PgDb};
use crate::error::AppError;
use crate::reconcile::{self, ReconcileSummary};
use crate::router::{HttpsTransport, PinnedThumbprint, RouterTransport, ZyxelClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSummary {
    pub devices: usize,
    pub reconciled: ReconcileSummary,
}

/// Run a poll against the configured router and database.
///
/// The database connection is closed before returning, on success or error.
pub async fn run_once(settings: &Settings) -> Result<PollSummary, AppError> {
    let now = Utc::now();

    let policy = Arc::new(PinnedThumbprint::new(settings.credentials.thumbprint.clone()));
    let transport = HttpsTransport::new(&settings.credentials.router_address, policy)?;
    let client = ZyxelClient::new(transport, settings.credentials.clone(), settings.verbose);

    let db = PgDb::connect(&settings.database_url).await?;
    let result = poll(&client, &db, now, settings.verbose).await;
    db.close().await;

    result
}

/// Fetch the active devices and merge them into `store` at `now`
pub async fn poll<T, S>(
    client: &ZyxelClient<T>,
    store: &S,
    now: DateTime<Utc>,
    verbose: bool,
) -> Result<PollSummary, AppError>
where
    T: RouterTransport,
    S: DeviceHistoryStore + ?Sized,
{
    let devices = client.active_devices().await?;
    if verbose {
        tracing::info!("[Poll] Found {} active devices", devices.len());
    }

    let reconciled = reconcile::reconcile(now, &devices, store).await?;
    tracing::info!(
        "[Poll] {} devices: {} intervals extended, {} opened",
        devices.len(),
        reconciled.extended,
        reconciled.inserted
    );

    Ok(PollSummary {
        devices: devices.len(),
        reconciled,
    })
}
