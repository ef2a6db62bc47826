//! Repository for the `sessions` table.

use gatekeep_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, OverdueSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, mac_address, ip_address, started_at, expires_at, active";

/// Provides CRUD operations for network-access sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, mac_address, ip_address, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.mac_address)
            .bind(&input.ip_address)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find the active, non-expired session for a user, if any.
    ///
    /// Returns the most recent one should several exist.
    pub async fn find_active_for_user(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE user_id = $1 AND active = true AND expires_at > $2
             ORDER BY started_at DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// List overdue sessions (active but past expiry), joined with the
    /// owning user's router key.
    pub async fn find_overdue(
        pool: &PgPool,
        now: Timestamp,
    ) -> Result<Vec<OverdueSession>, sqlx::Error> {
        sqlx::query_as::<_, OverdueSession>(
            "SELECT s.id, s.user_id, u.document
             FROM sessions s
             JOIN users u ON u.id = s.user_id
             WHERE s.active = true AND s.expires_at <= $1
             ORDER BY s.expires_at",
        )
        .bind(now)
        .fetch_all(pool)
        .await
    }

    /// Mark a session inactive. Returns `true` if the row was updated.
    pub async fn deactivate(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE sessions SET active = false WHERE id = $1 AND active = true")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark every active session of a user inactive. Returns the count.
    pub async fn deactivate_all_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE sessions SET active = false WHERE user_id = $1 AND active = true")
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete a session row outright.
    ///
    /// Used for caller-driven compensation when the device gateway
    /// refuses an authorization right after the session was created.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
