//! Repository for the `traffic_rankings` table (append + TTL purge).

use gatekeep_core::types::Timestamp;
use gatekeep_core::wire::ClientRecord;
use sqlx::PgPool;

use crate::models::telemetry::TrafficRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, router_name, ip_address, hostname, mac_address, \
                       bytes_up, bytes_down, recorded_at";

/// Columns written on insert (id and nothing else is generated).
const INSERT_COLUMNS: &str =
    "router_name, ip_address, hostname, mac_address, bytes_up, bytes_down, recorded_at";

/// Provides append and purge operations for client traffic rankings.
pub struct TrafficRepo;

impl TrafficRepo {
    /// Batch-insert one push of client records, all tagged with the
    /// same router name and timestamp.
    ///
    /// Uses multi-row INSERTs, chunked per [`INSERT_CHUNK_ROWS`].
    pub async fn insert_batch(
        pool: &PgPool,
        router_name: &str,
        records: &[ClientRecord],
        recorded_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut query = format!("INSERT INTO traffic_rankings ({INSERT_COLUMNS}) VALUES ");
            push_value_tuples(&mut query, chunk.len(), 7);

            let mut q = sqlx::query(&query);
            for r in chunk {
                q = q
                    .bind(router_name)
                    .bind(&r.ip_address)
                    .bind(&r.hostname)
                    .bind(&r.mac_address)
                    .bind(r.bytes_up)
                    .bind(r.bytes_down)
                    .bind(recorded_at);
            }
            q.execute(pool).await?;
        }
        Ok(())
    }

    /// Delete rows recorded before the cutoff. Returns the count.
    pub async fn delete_older_than(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM traffic_rankings WHERE recorded_at < $1")
            .bind(cutoff)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Fetch the most recent snapshot: every row sharing the maximum
    /// `recorded_at`, heaviest downloaders first.
    pub async fn latest_snapshot(pool: &PgPool) -> Result<Vec<TrafficRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM traffic_rankings
             WHERE recorded_at = (SELECT MAX(recorded_at) FROM traffic_rankings)
             ORDER BY bytes_down DESC
             LIMIT 200"
        );
        sqlx::query_as::<_, TrafficRow>(&query).fetch_all(pool).await
    }
}

/// Maximum rows per multi-row INSERT statement.
///
/// Postgres caps bind parameters at 65,535 per statement; the widest
/// telemetry table binds 7 per row, so 5,000 rows stays well clear.
pub(crate) const INSERT_CHUNK_ROWS: usize = 5_000;

/// Append `rows` parenthesized bind-parameter tuples of `width`
/// columns each to a VALUES clause.
pub(crate) fn push_value_tuples(query: &mut String, rows: usize, width: usize) {
    let mut param_idx = 1u32;
    for i in 0..rows {
        if i > 0 {
            query.push_str(", ");
        }
        query.push('(');
        for j in 0..width {
            if j > 0 {
                query.push_str(", ");
            }
            query.push('$');
            query.push_str(&param_idx.to_string());
            param_idx += 1;
        }
        query.push(')');
    }
}

#[cfg(test)]
mod tests {
    use super::push_value_tuples;

    #[test]
    fn value_tuples_number_params_sequentially() {
        let mut q = String::new();
        push_value_tuples(&mut q, 2, 3);
        assert_eq!(q, "($1, $2, $3), ($4, $5, $6)");
    }

    #[test]
    fn single_tuple() {
        let mut q = String::new();
        push_value_tuples(&mut q, 1, 2);
        assert_eq!(q, "($1, $2)");
    }
}
