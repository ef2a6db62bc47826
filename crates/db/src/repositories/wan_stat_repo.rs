//! Repository for the `wan_stats` table (append + TTL purge).

use gatekeep_core::types::Timestamp;
use gatekeep_core::wire::InterfaceRecord;
use sqlx::PgPool;

use crate::models::telemetry::WanStatRow;
use crate::repositories::traffic_repo::{push_value_tuples, INSERT_CHUNK_ROWS};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, router_name, interface_name, tx_bytes, rx_bytes, is_up, recorded_at";

const INSERT_COLUMNS: &str = "router_name, interface_name, tx_bytes, rx_bytes, is_up, recorded_at";

/// Provides append and purge operations for WAN interface stats.
pub struct WanStatRepo;

impl WanStatRepo {
    /// Batch-insert one push of interface records.
    pub async fn insert_batch(
        pool: &PgPool,
        router_name: &str,
        records: &[InterfaceRecord],
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut query = format!("INSERT INTO wan_stats ({INSERT_COLUMNS}) VALUES ");
            push_value_tuples(&mut query, chunk.len(), 6);

            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q
                    .bind(router_name)
                    .bind(&r.interface_name)
                    .bind(r.tx_bytes)
                    .bind(r.rx_bytes)
                    .bind(r.is_up)
                    .bind(recorded_at);
            }
            q.execute(pool).await?;
        }
        Ok(())
    }

    /// Delete rows recorded before the cutoff. Returns the count.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM wan_stats WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch rows recorded at or after the cutoff, newest first.
    pub async fn since(pool: &PgPool, cutoff: Timestamp) -> Result<Vec<WanStatRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM wan_stats
             WHERE recorded_at >= $1
             ORDER BY recorded_at DESC"
        );
        sqlx::query_as::<_, WanStatRow>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }
}
