//! Handlers for router telemetry pushes.
//!
//! Routers POST form-encoded payloads in the legacy wire format. The
//! shared ingestion key is checked in constant time before any byte
//! of the payload is parsed; a missing or wrong key is rejected with
//! 401 and nothing else happens.

use axum::extract::State;
use axum::{Form, Json};
use chrono::Utc;
use gatekeep_core::net::truncate_router_name;
use gatekeep_core::settings::verify_ingestion_key;
use gatekeep_core::wire;
use gatekeep_db::repositories::dns_repo::replace_details_snapshot;
use gatekeep_db::repositories::{TrafficRepo, WanStatRepo};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Retention window for client traffic rankings.
const TRAFFIC_TTL_DAYS: i64 = 30;
/// Retention window for WAN interface stats.
const WAN_TTL_DAYS: i64 = 7;

/// Form body of `POST /api/mikrotik/traffic`.
#[derive(Debug, Deserialize)]
pub struct TrafficPush {
    pub key: String,
    pub router: String,
    /// Client records, `IP,Hostname [MAC],bytesUp,bytesDown;...`
    #[serde(default)]
    pub data: String,
    /// WAN interface records, `Name,tx,rx,up|down;...`
    #[serde(default)]
    pub iface: String,
}

/// Form body of `POST /api/mikrotik/details`.
#[derive(Debug, Deserialize)]
pub struct DetailsPush {
    pub key: String,
    pub router: String,
    /// Connection records, `src,dst,port,bytesOrig,bytesReply;...`
    #[serde(default)]
    pub connections: String,
    /// DNS cache records, `domain>ip;...`
    #[serde(default)]
    pub dns: String,
}

async fn check_key(state: &AppState, supplied: &str) -> AppResult<()> {
    let configured = state.settings.ingestion_key().await;
    if verify_ingestion_key(supplied, &configured) {
        Ok(())
    } else {
        Err(AppError::Unauthorized("invalid ingestion key".to_string()))
    }
}

/// POST /api/mikrotik/traffic -- append client traffic + WAN stats.
pub async fn ingest_traffic(
    State(state): State<AppState>,
    Form(push): Form<TrafficPush>,
) -> AppResult<Json<serde_json::Value>> {
    check_key(&state, &push.key).await?;

    let router_name = truncate_router_name(&push.router);
    let recorded_at = Utc::now();

    let clients = wire::parse_clients(&push.data);
    let interfaces = wire::parse_interfaces(&push.iface);
    tracing::debug!(
        router = %router_name,
        clients = clients.len(),
        interfaces = interfaces.len(),
        "Telemetry traffic push"
    );

    TrafficRepo::insert_batch(&state.pool, &router_name, &clients, recorded_at).await?;
    WanStatRepo::insert_batch(&state.pool, &router_name, &interfaces, recorded_at).await?;

    // TTL purge rides along with the push; failures only log.
    let pool = state.pool.clone();
    tokio::spawn(async move {
        let traffic_cutoff = Utc::now() - chrono::Duration::days(TRAFFIC_TTL_DAYS);
        if let Err(e) = TrafficRepo::delete_older_than(&pool, traffic_cutoff).await {
            tracing::warn!(error = %e, "Traffic TTL purge failed");
        }
        let wan_cutoff = Utc::now() - chrono::Duration::days(WAN_TTL_DAYS);
        if let Err(e) = WanStatRepo::delete_older_than(&pool, wan_cutoff).await {
            tracing::warn!(error = %e, "WAN stats TTL purge failed");
        }
    });

    Ok(Json(json!({ "ok": true })))
}

/// POST /api/mikrotik/details -- atomically replace the connection
/// and DNS snapshots.
pub async fn ingest_details(
    State(state): State<AppState>,
    Form(push): Form<DetailsPush>,
) -> AppResult<Json<serde_json::Value>> {
    check_key(&state, &push.key).await?;

    let router_name = truncate_router_name(&push.router);
    let connections = wire::parse_connections(&push.connections);
    let dns = wire::parse_dns(&push.dns);
    tracing::debug!(
        router = %router_name,
        connections = connections.len(),
        dns = dns.len(),
        "Telemetry details push"
    );

    replace_details_snapshot(&state.pool, &router_name, &connections, &dns, Utc::now()).await?;

    Ok(Json(json!({ "ok": true })))
}
