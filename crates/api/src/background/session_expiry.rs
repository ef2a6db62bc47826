//! Periodic sweep deactivating overdue sessions.
//!
//! Runs on a fixed interval using `tokio::time::interval` and revokes
//! router access for every session past its expiry. The sweep is
//! idempotent: a run that finds nothing overdue performs no router
//! calls.

use std::sync::Arc;
use std::time::Duration;

use gatekeep_db::DbPool;
use gatekeep_routeros::DeviceGateway;
use tokio_util::sync::CancellationToken;

use crate::sessions;

/// Run the session expiry loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    gateway: Arc<DeviceGateway>,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Session expiry job started");

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session expiry job stopping");
                break;
            }
            _ = ticker.tick() => {
                match sessions::expire_overdue(&pool, &gateway).await {
                    Ok(0) => tracing::debug!("Session expiry: nothing overdue"),
                    Ok(expired) => tracing::info!(expired, "Session expiry: sessions revoked"),
                    Err(e) => tracing::error!(error = %e, "Session expiry sweep failed"),
                }
            }
        }
    }
}
