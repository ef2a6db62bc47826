//! Route definitions for the portal JSON surface.

use axum::routing::post;
use axum::Router;

use crate::handlers::portal;
use crate::state::AppState;

/// ```text
/// POST /portal/register    -> register
/// POST /portal/login       -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/portal/register", post(portal::register))
        .route("/portal/login", post(portal::login))
}
