//! Database-backed [`SettingsProvider`] implementation.
//!
//! Reads from the `settings` table on every lookup; values are small
//! and the calls are infrequent (per request / per probe cycle), so
//! no cache layer sits in front. The ingestion key additionally falls
//! back to the `INGEST_KEY` environment variable when the table has
//! no row, matching how deployments bootstrap the secret before the
//! admin surface first writes it.

use gatekeep_core::settings::{SettingsProvider, KEY_INGESTION_KEY};

use crate::repositories::SettingRepo;
use crate::DbPool;

/// Environment fallback for the ingestion key.
const INGEST_KEY_ENV: &str = "INGEST_KEY";

/// Settings provider over the `settings` table.
#[derive(Clone)]
pub struct DbSettings {
    pool: DbPool,
}

impl DbSettings {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Resolve the configured ingestion key.
    ///
    /// A stored row always wins, even when its value is empty:
    /// clearing the key is how an admin disables ingestion, and the
    /// env default must not silently re-enable it. The `INGEST_KEY`
    /// environment fallback applies only while no row exists at all.
    /// Lookup failures resolve to empty (ingestion disabled) so an
    /// unreachable database rejects pushes rather than crashing the
    /// handler.
    pub async fn ingestion_key(&self) -> String {
        match SettingRepo::get(&self.pool, KEY_INGESTION_KEY).await {
            Ok(Some(value)) => value,
            Ok(None) => std::env::var(INGEST_KEY_ENV).unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Settings lookup failed, treating ingestion key as unset");
                String::new()
            }
        }
    }
}

#[async_trait::async_trait]
impl SettingsProvider for DbSettings {
    async fn get_string(&self, key: &str, default: &str) -> String {
        match SettingRepo::get(&self.pool, key).await {
            Ok(Some(value)) => value,
            Ok(None) => default.to_string(),
            Err(e) => {
                tracing::warn!(key, error = %e, "Settings lookup failed, using default");
                default.to_string()
            }
        }
    }

    async fn get_int(&self, key: &str, default: i64) -> i64 {
        match SettingRepo::get(&self.pool, key).await {
            Ok(Some(value)) => value.trim().parse().unwrap_or(default),
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key, error = %e, "Settings lookup failed, using default");
                default
            }
        }
    }
}
