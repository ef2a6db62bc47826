//! Permanent user deletion (data-subject erasure).

use axum::extract::{Path, State};
use axum::Json;
use gatekeep_core::error::CoreError;
use gatekeep_db::repositories::{SessionRepo, UserRepo};
use serde_json::json;

use crate::error::AppResult;
use crate::state::AppState;

/// DELETE /api/users/{id} -- erase a user everywhere.
///
/// Deactivates all sessions, removes the hotspot user and bindings
/// from the router, then deletes the database rows. The router step
/// is best effort: a refusal is logged but does not keep the rows
/// alive, since erasure must not depend on router availability.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<serde_json::Value>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "user", id })?;

    let deactivated = SessionRepo::deactivate_all_for_user(&state.pool, user.id).await?;
    if deactivated > 0 {
        tracing::info!(user_id = user.id, deactivated, "Deactivated sessions before deletion");
    }

    if !state.gateway.deauthorize(&user.document, true).await {
        tracing::warn!(user_id = user.id, "Router-side cleanup failed during user deletion");
    }

    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User permanently deleted");
    Ok(Json(json!({ "ok": true })))
}
