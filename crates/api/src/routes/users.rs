//! Route definitions for user administration.

use axum::routing::delete;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// ```text
/// DELETE /users/{id}   -> delete (permanent erasure)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/users/{id}", delete(users::delete))
}
