//! Access-point management and on-demand probing.

use axum::extract::{Path, State};
use axum::Json;
use gatekeep_core::error::CoreError;
use gatekeep_core::net::is_valid_ipv4;
use gatekeep_core::settings;
use gatekeep_db::models::access_point::{AccessPoint, CreateAccessPoint, PingHistoryRecord};
use gatekeep_db::repositories::{AccessPointRepo, PingHistoryRepo};
use gatekeep_monitor::{probe_all, AlertSender};
use serde::Serialize;
use serde_json::json;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Most history rows returned by the history endpoint.
const HISTORY_LIMIT: i64 = 100;

/// An access point plus its derived status word.
#[derive(Debug, Serialize)]
pub struct AccessPointView {
    #[serde(flatten)]
    pub ap: AccessPoint,
    /// `unknown` until first probe, then `online`/`offline`.
    pub status: &'static str,
}

fn status_word(is_online: Option<bool>) -> &'static str {
    match is_online {
        None => "unknown",
        Some(true) => "online",
        Some(false) => "offline",
    }
}

/// GET /api/access-points -- list with status tallies.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let aps = AccessPointRepo::list_all(&state.pool).await?;

    let online = aps.iter().filter(|ap| ap.is_online == Some(true)).count();
    let offline = aps.iter().filter(|ap| ap.is_online == Some(false)).count();
    let views: Vec<AccessPointView> = aps
        .into_iter()
        .map(|ap| AccessPointView {
            status: status_word(ap.is_online),
            ap,
        })
        .collect();

    Ok(Json(json!({
        "data": views,
        "online": online,
        "offline": offline,
    })))
}

/// POST /api/access-points -- register a new access point.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateAccessPoint>,
) -> AppResult<Json<DataResponse<AccessPoint>>> {
    if input.name.trim().is_empty() {
        return Err(CoreError::Validation("name is required".to_string()).into());
    }
    if !is_valid_ipv4(&input.ip_address) {
        return Err(CoreError::Validation(format!(
            "'{}' is not a valid IPv4 address",
            input.ip_address
        ))
        .into());
    }

    let ap = AccessPointRepo::create(&state.pool, &input).await?;
    tracing::info!(ap_id = ap.id, name = %ap.name, "Access point registered");
    Ok(Json(DataResponse { data: ap }))
}

/// DELETE /api/access-points/{id} -- remove an AP and its history.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    if !AccessPointRepo::delete(&state.pool, id).await? {
        return Err(CoreError::NotFound {
            entity: "access point",
            id,
        }
        .into());
    }
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/access-points/probe -- run a probe cycle right now.
pub async fn probe_now(State(state): State<AppState>) -> AppResult<Json<serde_json::Value>> {
    let webhook_url = settings::alert_webhook_url(&state.settings).await;
    let alert_sender = AlertSender::new();
    let reports = probe_all(&state.pool, &alert_sender, &webhook_url).await?;

    let results: Vec<serde_json::Value> = reports
        .iter()
        .map(|r| {
            json!({
                "id": r.ap_id,
                "name": r.name,
                "online": r.outcome.online,
                "latency_ms": r.outcome.latency_ms,
            })
        })
        .collect();
    Ok(Json(json!({ "data": results })))
}

/// GET /api/access-points/{id}/history -- newest probe history rows.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DataResponse<Vec<PingHistoryRecord>>>> {
    if AccessPointRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(CoreError::NotFound {
            entity: "access point",
            id,
        }
        .into());
    }

    let rows = PingHistoryRepo::recent(&state.pool, id, HISTORY_LIMIT).await?;
    Ok(Json(DataResponse { data: rows }))
}
