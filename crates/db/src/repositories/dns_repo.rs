//! Repository for the `dns_entries` snapshot table.

use gatekeep_core::types::Timestamp;
use gatekeep_core::wire::{ConnectionRecord, DnsRecord};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::telemetry::DnsRow;
use crate::repositories::traffic_repo::{push_value_tuples, INSERT_CHUNK_ROWS};
use crate::repositories::ConnectionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, router_name, domain, ip_address, recorded_at";

const INSERT_COLUMNS: &str = "router_name, domain, ip_address, recorded_at";

/// Provides snapshot-replace operations for DNS cache rows.
pub struct DnsRepo;

impl DnsRepo {
    /// Replace the whole table contents within a caller-owned
    /// transaction. See [`ConnectionRepo::replace_all`].
    pub async fn replace_all(
        tx: &mut Transaction<'_, Postgres>,
        router_name: &str,
        records: &[DnsRecord],
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM dns_entries").execute(&mut **tx).await?;

        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut query = format!("INSERT INTO dns_entries ({INSERT_COLUMNS}) VALUES ");
            push_value_tuples(&mut query, chunk.len(), 4);

            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q
                    .bind(router_name)
                    .bind(&r.domain)
                    .bind(&r.ip_address)
                    .bind(recorded_at);
            }
            q.execute(&mut **tx).await?;
        }
        Ok(())
    }

    /// Fetch the current snapshot.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<DnsRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dns_entries ORDER BY domain");
        sqlx::query_as::<_, DnsRow>(&query).fetch_all(pool).await
    }
}

/// Atomically swap both detail snapshots (connections + DNS).
///
/// Nothing observing the store sees a transient empty state, and a
/// failure anywhere in the unit rolls back to the prior snapshot.
pub async fn replace_details_snapshot(
    pool: &PgPool,
    router_name: &str,
    connections: &[ConnectionRecord],
    dns: &[DnsRecord],
    recorded_at: Timestamp,
) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    ConnectionRepo::replace_all(&mut tx, router_name, connections, recorded_at).await?;
    DnsRepo::replace_all(&mut tx, router_name, dns, recorded_at).await?;
    tx.commit().await
}
