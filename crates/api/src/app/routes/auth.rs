use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;

use stockscan_auth::{CurrentUser, normalize_email, validate_login, validate_sign_up};
use stockscan_core::{SessionId, UserId};

use crate::app::dto::{LoginRequest, SessionResponse, SignUpRequest};
use crate::app::errors::{ApiError, ApiResult};
use crate::app::services::AppServices;
use crate::context::UserContext;

/// Issue a token and register a live session for `user_id`.
fn start_session(services: &AppServices, user_id: UserId, email: String) -> ApiResult<SessionResponse> {
    let now = Utc::now();
    let session_id = SessionId::new();
    let token = services.issuer.issue(user_id, session_id, &email, now)?;
    let expires_at = now
        .checked_add_signed(services.token_ttl)
        .ok_or_else(|| ApiError::Internal("session lifetime out of range".to_string()))?;

    services.sessions.start(
        session_id,
        CurrentUser {
            user_id,
            email: email.clone(),
        },
        expires_at,
        services.page_size,
    );
    tracing::info!(user_id = %user_id, session_id = %session_id, "session started");

    Ok(SessionResponse {
        token,
        user_id,
        email,
        expires_at,
    })
}

pub async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<SignUpRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_sign_up(&body.email, &body.password, &body.confirm_password)?;

    let email = normalize_email(&body.email);
    let user_id = services.identity.sign_up(&email, &body.password).await?;
    tracing::info!(user_id = %user_id, "account created");

    let session = start_session(&services, user_id, email)?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    validate_login(&body.email, &body.password)?;

    let email = normalize_email(&body.email);
    let user_id = services.identity.sign_in(&email, &body.password).await?;

    Ok(Json(start_session(&services, user_id, email)?))
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> StatusCode {
    services.sessions.end(user.session_id()).await;
    StatusCode::NO_CONTENT
}
