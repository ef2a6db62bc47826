//! Session lifecycle: creation with policy-driven expiry, reuse of
//! active sessions, and the overdue expiry sweep.
//!
//! Session rows and router authorization are not atomic. The portal
//! flow creates the session first and compensates (destroys it) when
//! the gateway refuses, so a failed authorization never leaves a
//! dangling active session behind.

use chrono::Utc;
use gatekeep_core::settings::{self, SettingsProvider};
use gatekeep_db::models::session::{CreateSession, Session};
use gatekeep_db::repositories::SessionRepo;
use gatekeep_db::DbPool;
use gatekeep_routeros::DeviceGateway;

use crate::error::{AppError, AppResult};

/// A session plus whether it was freshly created by this call.
#[derive(Debug)]
pub struct SessionHandle {
    pub session: Session,
    pub created: bool,
}

/// Return the user's active session, creating one if none exists.
///
/// Expiry is `now + session_duration_hours` from the settings store,
/// clamped to the allowed range.
pub async fn create_or_reuse(
    pool: &DbPool,
    settings: &dyn SettingsProvider,
    user_id: i64,
    mac: Option<&str>,
    ip: Option<&str>,
) -> Result<SessionHandle, sqlx::Error> {
    let now = Utc::now();

    if let Some(session) = SessionRepo::find_active_for_user(pool, user_id, now).await? {
        tracing::debug!(user_id, session_id = session.id, "Reusing active session");
        return Ok(SessionHandle {
            session,
            created: false,
        });
    }

    let hours = settings::session_duration_hours(settings).await;
    let session = SessionRepo::create(
        pool,
        &CreateSession {
            user_id,
            mac_address: mac.map(str::to_string),
            ip_address: ip.map(str::to_string),
            expires_at: now + chrono::Duration::hours(hours),
        },
    )
    .await?;

    tracing::info!(user_id, session_id = session.id, hours, "Session created");
    Ok(SessionHandle {
        session,
        created: true,
    })
}

/// Portal flow: ensure a session exists, then authorize on the router.
///
/// When the gateway refuses and the session was created by this call,
/// the session is destroyed again (caller-driven compensation). A
/// reused session is left alone.
pub async fn authorize_user(
    pool: &DbPool,
    settings: &dyn SettingsProvider,
    gateway: &DeviceGateway,
    user_key: &str,
    display_name: &str,
    user_id: i64,
    mac: Option<&str>,
    ip: Option<&str>,
) -> AppResult<Session> {
    let handle = create_or_reuse(pool, settings, user_id, mac, ip).await?;

    if gateway.authorize(mac, ip, user_key, display_name).await {
        return Ok(handle.session);
    }

    if handle.created {
        if let Err(e) = SessionRepo::delete(pool, handle.session.id).await {
            tracing::error!(
                session_id = handle.session.id,
                error = %e,
                "Failed to roll back session after refused authorization"
            );
        }
    }
    Err(AppError::InternalError(
        "router refused the authorization".to_string(),
    ))
}

/// Deactivate overdue sessions and revoke their router access.
///
/// Per-session failures are logged and the sweep continues. Running
/// the sweep twice back-to-back performs no work the second time:
/// deactivation removes the session from the overdue set.
pub async fn expire_overdue(pool: &DbPool, gateway: &DeviceGateway) -> Result<u64, sqlx::Error> {
    let overdue = SessionRepo::find_overdue(pool, Utc::now()).await?;
    if overdue.is_empty() {
        return Ok(0);
    }

    let mut expired = 0u64;
    for session in overdue {
        match SessionRepo::deactivate(pool, session.id).await {
            Ok(true) => expired += 1,
            Ok(false) => continue, // already handled by a concurrent sweep
            Err(e) => {
                tracing::error!(session_id = session.id, error = %e, "Failed to deactivate session");
                continue;
            }
        }

        if !gateway.deauthorize(&session.document, false).await {
            tracing::warn!(
                session_id = session.id,
                user_id = session.user_id,
                "Router deauthorization failed for expired session"
            );
        }
    }

    tracing::info!(expired, "Expired overdue sessions");
    Ok(expired)
}
