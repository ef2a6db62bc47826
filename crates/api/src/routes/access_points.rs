//! Route definitions for access-point monitoring.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::access_points;
use crate::state::AppState;

/// ```text
/// GET    /access-points                -> list
/// POST   /access-points                -> create
/// POST   /access-points/probe          -> probe_now
/// DELETE /access-points/{id}           -> delete
/// GET    /access-points/{id}/history   -> history
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/access-points",
            get(access_points::list).post(access_points::create),
        )
        .route("/access-points/probe", post(access_points::probe_now))
        .route("/access-points/{id}", delete(access_points::delete))
        .route("/access-points/{id}/history", get(access_points::history))
}
