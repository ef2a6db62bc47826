pub mod access_points;
pub mod health;
pub mod portal;
pub mod telemetry;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /mikrotik/traffic                    telemetry push (traffic + WAN)
/// /mikrotik/details                    telemetry push (connections + DNS)
///
/// /portal/register                     create user + authorize device
/// /portal/login                        authorize device for known user
///
/// /access-points                       list, create
/// /access-points/{id}                  delete
/// /access-points/probe                 probe all now (POST)
/// /access-points/{id}/history          recent probe history
///
/// /users/{id}                          permanent deletion (DELETE)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(telemetry::router())
        .merge(portal::router())
        .merge(access_points::router())
        .merge(users::router())
}
