//! Periodic access-point probe cycle.
//!
//! The webhook URL is re-read from settings each cycle so an admin
//! change takes effect without a restart.

use std::time::Duration;

use gatekeep_core::settings;
use gatekeep_db::settings::DbSettings;
use gatekeep_db::DbPool;
use gatekeep_monitor::{probe_all, AlertSender};
use tokio_util::sync::CancellationToken;

/// Run the probe loop until `cancel` is triggered.
pub async fn run(
    pool: DbPool,
    db_settings: DbSettings,
    interval: Duration,
    cancel: CancellationToken,
) {
    tracing::info!(interval_secs = interval.as_secs(), "Access point probe job started");

    let alert_sender = AlertSender::new();
    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Access point probe job stopping");
                break;
            }
            _ = ticker.tick() => {
                let webhook_url = settings::alert_webhook_url(&db_settings).await;
                if let Err(e) = probe_all(&pool, &alert_sender, &webhook_url).await {
                    tracing::error!(error = %e, "Access point probe cycle failed");
                }
            }
        }
    }
}
