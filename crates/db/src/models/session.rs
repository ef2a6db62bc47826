//! Network-access session entity.

use gatekeep_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sessions` table.
///
/// At most one `active = true` row per user is meaningful for reuse;
/// this is enforced by lookup, not by a database constraint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub user_id: DbId,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub started_at: Timestamp,
    pub expires_at: Timestamp,
    pub active: bool,
}

/// DTO for creating a session.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub user_id: DbId,
    pub mac_address: Option<String>,
    pub ip_address: Option<String>,
    pub expires_at: Timestamp,
}

/// An overdue session joined with its owner's router user key, as
/// consumed by the expiry sweep.
#[derive(Debug, Clone, FromRow)]
pub struct OverdueSession {
    pub id: DbId,
    pub user_id: DbId,
    pub document: String,
}
