//! Portal registration and login.
//!
//! JSON endpoints only; the HTML portal pages live in a separate
//! frontend. Both flows end in the same place: an active session plus
//! router authorization for the caller's device.

use axum::extract::State;
use axum::Json;
use gatekeep_core::error::CoreError;
use gatekeep_db::models::session::Session;
use gatekeep_db::models::user::{CreateUser, User};
use gatekeep_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::sessions;
use crate::state::AppState;

/// Body of `POST /api/portal/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub document: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mac: Option<String>,
    pub ip: Option<String>,
}

/// Body of `POST /api/portal/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub document: String,
    pub mac: Option<String>,
    pub ip: Option<String>,
}

/// Response for both portal flows.
#[derive(Debug, Serialize)]
pub struct PortalResponse {
    pub user: User,
    pub session: Session,
}

/// POST /api/portal/register -- create the user and authorize their
/// device.
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<Json<DataResponse<PortalResponse>>> {
    let full_name = req.full_name.trim();
    let document = req.document.trim();
    if full_name.is_empty() {
        return Err(CoreError::Validation("full_name is required".to_string()).into());
    }
    if document.is_empty() {
        return Err(CoreError::Validation("document is required".to_string()).into());
    }

    if UserRepo::find_by_document(&state.pool, document).await?.is_some() {
        return Err(CoreError::Conflict(format!(
            "a user with document {document} already exists"
        ))
        .into());
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            full_name: full_name.to_string(),
            document: document.to_string(),
            email: req.email,
            phone: req.phone,
        },
    )
    .await?;

    let session = grant_access(&state, &user, req.mac.as_deref(), req.ip.as_deref()).await?;
    Ok(Json(DataResponse {
        data: PortalResponse { user, session },
    }))
}

/// POST /api/portal/login -- re-authorize a known user's device.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<PortalResponse>>> {
    let document = req.document.trim();
    let user = UserRepo::find_by_document(&state.pool, document)
        .await?
        .ok_or_else(|| AppError::BadRequest("unknown document".to_string()))?;

    let session = grant_access(&state, &user, req.mac.as_deref(), req.ip.as_deref()).await?;
    Ok(Json(DataResponse {
        data: PortalResponse { user, session },
    }))
}

async fn grant_access(
    state: &AppState,
    user: &User,
    mac: Option<&str>,
    ip: Option<&str>,
) -> AppResult<Session> {
    sessions::authorize_user(
        &state.pool,
        &state.settings,
        &state.gateway,
        &user.document,
        &user.full_name,
        user.id,
        mac,
        ip,
    )
    .await
}
