use axum::{
    routing::{get, post},
    Router,
};

use crate::app::errors::ApiError;

pub mod auth;
pub mod export;
pub mod inventory;
pub mod scan;
pub mod system;

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
}

/// Router for all authenticated (session-scoped) endpoints.
pub fn router(max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/logout", post(auth::logout))
        .nest("/inventory", inventory::router(max_upload_bytes))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
