//! Probe sweep over all active access points.

use chrono::Utc;
use futures::future::join_all;
use gatekeep_db::models::access_point::AccessPoint;
use gatekeep_db::repositories::{AccessPointRepo, PingHistoryRepo};
use gatekeep_db::DbPool;

use crate::alert::AlertSender;
use crate::ping::{ping_host, ProbeOutcome};

/// What happened to one access point during a sweep.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub ap_id: i64,
    pub name: String,
    pub outcome: ProbeOutcome,
    pub transition: Transition,
}

/// State change relative to the previous probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Same state as before, or first probe ever.
    None,
    WentOffline,
    CameOnline,
}

/// Compare the previous known state to the new probe result.
///
/// A `None` previous state means the AP has never been probed, which
/// never counts as a transition.
fn detect_transition(previous: Option<bool>, online: bool) -> Transition {
    match (previous, online) {
        (Some(true), false) => Transition::WentOffline,
        (Some(false), true) => Transition::CameOnline,
        _ => Transition::None,
    }
}

/// Probe every active access point once.
///
/// Probes run concurrently; the sweep finishes when the slowest one
/// does. Each AP's bookkeeping is independent: a history or alert
/// failure is logged and the sweep carries on.
pub async fn probe_all(
    pool: &DbPool,
    alert_sender: &AlertSender,
    webhook_url: &str,
) -> Result<Vec<ProbeReport>, sqlx::Error> {
    let access_points = AccessPointRepo::list_active(pool).await?;
    if access_points.is_empty() {
        return Ok(Vec::new());
    }

    let probes = access_points.iter().map(|ap| ping_host(&ap.ip_address));
    let outcomes = join_all(probes).await;

    let mut reports = Vec::with_capacity(access_points.len());
    for (ap, outcome) in access_points.into_iter().zip(outcomes) {
        let report = record_outcome(pool, alert_sender, webhook_url, ap, outcome).await;
        reports.push(report);
    }

    let online = reports.iter().filter(|r| r.outcome.online).count();
    tracing::info!(
        total = reports.len(),
        online,
        offline = reports.len() - online,
        "Access point sweep complete"
    );
    Ok(reports)
}

/// Persist one probe outcome and fire any transition alert.
///
/// This is the per-AP bookkeeping step of a sweep: store the result,
/// append (and cap) history, and dispatch an offline alert when the
/// AP just dropped. Alert delivery is spawned off so its retry
/// schedule never stalls the caller.
pub async fn record_outcome(
    pool: &DbPool,
    alert_sender: &AlertSender,
    webhook_url: &str,
    ap: AccessPoint,
    outcome: ProbeOutcome,
) -> ProbeReport {
    let checked_at = Utc::now();
    let previous = ap.is_online;

    if let Err(e) =
        AccessPointRepo::update_probe_result(pool, ap.id, outcome.online, outcome.latency_ms, checked_at)
            .await
    {
        tracing::error!(ap = %ap.name, error = %e, "Failed to store probe result");
    }

    // Best effort: history bookkeeping must not abort the sweep.
    match PingHistoryRepo::insert(pool, ap.id, outcome.online, outcome.latency_ms, checked_at).await
    {
        Ok(_) => {
            if let Err(e) = PingHistoryRepo::evict_beyond_limit(pool, ap.id).await {
                tracing::warn!(ap = %ap.name, error = %e, "Failed to evict old ping history");
            }
        }
        Err(e) => {
            tracing::warn!(ap = %ap.name, error = %e, "Failed to append ping history");
        }
    }

    let transition = detect_transition(previous, outcome.online);
    match transition {
        Transition::WentOffline => {
            tracing::warn!(ap = %ap.name, ip = %ap.ip_address, "Access point went offline");
            // Delivery retries can take several seconds; they must not
            // stall the sweep.
            let sender = alert_sender.clone();
            let url = webhook_url.to_string();
            let offline_ap = ap.clone();
            tokio::spawn(async move {
                sender.notify_offline(&url, &offline_ap).await;
            });
        }
        Transition::CameOnline => {
            tracing::info!(ap = %ap.name, ip = %ap.ip_address, "Access point back online");
        }
        Transition::None => {}
    }

    ProbeReport {
        ap_id: ap.id,
        name: ap.name,
        outcome,
        transition,
    }
}
