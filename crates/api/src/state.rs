use std::sync::Arc;

use gatekeep_db::settings::DbSettings;
use gatekeep_routeros::DeviceGateway;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gatekeep_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Router control-plane gateway (single shared connection).
    pub gateway: Arc<DeviceGateway>,
    /// Dynamic settings backed by the `settings` table.
    pub settings: DbSettings,
}
