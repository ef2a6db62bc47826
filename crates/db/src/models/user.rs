//! Portal user entity.

use gatekeep_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `users` table.
///
/// `document` is the stable identifier also used as the hotspot-user
/// key on the router control plane.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub full_name: String,
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for registering a new portal user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub full_name: String,
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}
