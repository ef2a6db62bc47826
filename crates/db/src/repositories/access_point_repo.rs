//! Repository for the `access_points` table.

use gatekeep_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::access_point::{AccessPoint, CreateAccessPoint};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, ip_address, location, active, is_online, latency_ms, \
                       last_checked_at, created_at, updated_at";

/// Provides CRUD and probe-bookkeeping operations for access points.
pub struct AccessPointRepo;

impl AccessPointRepo {
    /// Insert a new access point, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAccessPoint,
    ) -> Result<AccessPoint, sqlx::Error> {
        let query = format!(
            "INSERT INTO access_points (name, ip_address, location)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AccessPoint>(&query)
            .bind(&input.name)
            .bind(&input.ip_address)
            .bind(&input.location)
            .fetch_one(pool)
            .await
    }

    /// List every access point, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<AccessPoint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_points ORDER BY name");
        sqlx::query_as::<_, AccessPoint>(&query).fetch_all(pool).await
    }

    /// List access points with monitoring enabled.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<AccessPoint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_points WHERE active = true ORDER BY name");
        sqlx::query_as::<_, AccessPoint>(&query).fetch_all(pool).await
    }

    /// Fetch a single access point by id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AccessPoint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM access_points WHERE id = $1");
        sqlx::query_as::<_, AccessPoint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Write the outcome of one probe onto the access point row.
    pub async fn update_probe_result(
        pool: &PgPool,
        id: DbId,
        is_online: bool,
        latency_ms: Option<i32>,
        checked_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE access_points
             SET is_online = $2, latency_ms = $3, last_checked_at = $4, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(is_online)
        .bind(latency_ms)
        .bind(checked_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete an access point. History rows cascade via foreign key.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM access_points WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
