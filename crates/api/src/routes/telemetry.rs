//! Route definitions for router telemetry ingestion.

use axum::routing::post;
use axum::Router;

use crate::handlers::telemetry;
use crate::state::AppState;

/// Routes mounted at `/api/mikrotik`, matching the paths baked into
/// deployed router sender scripts.
///
/// ```text
/// POST /mikrotik/traffic   -> ingest_traffic
/// POST /mikrotik/details   -> ingest_details
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/mikrotik/traffic", post(telemetry::ingest_traffic))
        .route("/mikrotik/details", post(telemetry::ingest_details))
}
