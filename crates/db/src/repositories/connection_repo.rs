//! Repository for the `client_connections` snapshot table.

use gatekeep_core::types::Timestamp;
use gatekeep_core::wire::ConnectionRecord;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::telemetry::ConnectionRow;
use crate::repositories::traffic_repo::{push_value_tuples, INSERT_CHUNK_ROWS};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, router_name, src_ip, dst_ip, dst_port, bytes_orig, bytes_reply, recorded_at";

const INSERT_COLUMNS: &str =
    "router_name, src_ip, dst_ip, dst_port, bytes_orig, bytes_reply, recorded_at";

/// Provides snapshot-replace operations for connection rows.
pub struct ConnectionRepo;

impl ConnectionRepo {
    /// Replace the whole table contents within a caller-owned
    /// transaction: delete everything, then bulk-insert the new
    /// snapshot. Rolling back the transaction restores the prior
    /// snapshot.
    pub async fn replace_all(
        tx: &mut Transaction<'_, Postgres>,
        router_name: &str,
        records: &[ConnectionRecord],
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM client_connections")
            .execute(&mut **tx)
            .await?;

        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut query = format!("INSERT INTO client_connections ({INSERT_COLUMNS}) VALUES ");
            push_value_tuples(&mut query, chunk.len(), 7);

            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q
                    .bind(router_name)
                    .bind(&r.src_ip)
                    .bind(&r.dst_ip)
                    .bind(r.dst_port)
                    .bind(r.bytes_orig)
                    .bind(r.bytes_reply)
                    .bind(recorded_at);
            }
            q.execute(&mut **tx).await?;
        }
        Ok(())
    }

    /// Fetch the current snapshot, heaviest flows first.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ConnectionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM client_connections
             ORDER BY bytes_orig + bytes_reply DESC"
        );
        sqlx::query_as::<_, ConnectionRow>(&query).fetch_all(pool).await
    }
}
