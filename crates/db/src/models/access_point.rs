//! Access-point entity and probe history.

use gatekeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `access_points` table.
///
/// `is_online` is `None` until the first probe completes. Probe fields
/// are mutated only by the monitor.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccessPoint {
    pub id: DbId,
    pub name: String,
    pub ip_address: String,
    pub location: Option<String>,
    pub active: bool,
    pub is_online: Option<bool>,
    pub latency_ms: Option<i32>,
    pub last_checked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a new access point.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAccessPoint {
    pub name: String,
    pub ip_address: String,
    pub location: Option<String>,
}

/// A row from the `ap_ping_history` table (append-only, bounded to
/// the newest 200 rows per access point).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PingHistoryRecord {
    pub id: DbId,
    pub ap_id: DbId,
    pub is_online: bool,
    pub latency_ms: Option<i32>,
    pub checked_at: Timestamp,
}
