//! Repository for the `ap_ping_history` table (append-only, bounded).

use gatekeep_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::access_point::PingHistoryRecord;

/// Maximum history rows retained per access point.
pub const MAX_PER_AP: i64 = 200;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, ap_id, is_online, latency_ms, checked_at";

/// Provides append and eviction operations for probe history.
pub struct PingHistoryRepo;

impl PingHistoryRepo {
    /// Append one probe outcome for an access point.
    pub async fn insert(
        pool: &PgPool,
        ap_id: DbId,
        is_online: bool,
        latency_ms: Option<i32>,
        checked_at: Timestamp,
    ) -> Result<PingHistoryRecord, sqlx::Error> {
        let query = format!(
            "INSERT INTO ap_ping_history (ap_id, is_online, latency_ms, checked_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PingHistoryRecord>(&query)
            .bind(ap_id)
            .bind(is_online)
            .bind(latency_ms)
            .bind(checked_at)
            .fetch_one(pool)
            .await
    }

    /// Delete all but the newest [`MAX_PER_AP`] rows for an access
    /// point. Runs after every insert. Returns the evicted count.
    pub async fn evict_beyond_limit(pool: &PgPool, ap_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM ap_ping_history
             WHERE ap_id = $1 AND id NOT IN (
                 SELECT id FROM ap_ping_history
                 WHERE ap_id = $1
                 ORDER BY checked_at DESC, id DESC
                 LIMIT $2
             )",
        )
        .bind(ap_id)
        .bind(MAX_PER_AP)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Fetch the newest `limit` history rows for an access point.
    pub async fn recent(
        pool: &PgPool,
        ap_id: DbId,
        limit: i64,
    ) -> Result<Vec<PingHistoryRecord>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ap_ping_history
             WHERE ap_id = $1
             ORDER BY checked_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, PingHistoryRecord>(&query)
            .bind(ap_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Count history rows for an access point.
    pub async fn count_for_ap(pool: &PgPool, ap_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM ap_ping_history WHERE ap_id = $1")
                .bind(ap_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
