//! Router telemetry entities.
//!
//! Traffic and WAN rows are appended per push and purged by TTL.
//! Connection and DNS rows are point-in-time snapshots replaced
//! wholesale on each ingestion.

use gatekeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `traffic_rankings` table (per-client byte counters).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrafficRow {
    pub id: DbId,
    pub router_name: String,
    pub ip_address: String,
    pub hostname: Option<String>,
    pub mac_address: Option<String>,
    pub bytes_up: i64,
    pub bytes_down: i64,
    pub recorded_at: Timestamp,
}

/// A row from the `wan_stats` table (per-interface byte deltas).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WanStatRow {
    pub id: DbId,
    pub router_name: String,
    pub interface_name: String,
    pub tx_bytes: i64,
    pub rx_bytes: i64,
    pub is_up: bool,
    pub recorded_at: Timestamp,
}

/// A row from the `client_connections` snapshot table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConnectionRow {
    pub id: DbId,
    pub router_name: String,
    pub src_ip: String,
    pub dst_ip: String,
    pub dst_port: Option<i32>,
    pub bytes_orig: i64,
    pub bytes_reply: i64,
    pub recorded_at: Timestamp,
}

/// A row from the `dns_entries` snapshot table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DnsRow {
    pub id: DbId,
    pub router_name: String,
    pub domain: String,
    pub ip_address: Option<String>,
    pub recorded_at: Timestamp,
}
