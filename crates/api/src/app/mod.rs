//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: collaborator wiring (store, identity, tokens, vision, sessions)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::{AppServices, StartupError};

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> Result<Router, StartupError> {
    let services = AppServices::from_config(config).await?;
    Ok(build_router(Arc::new(services)))
}

/// Router over already-assembled services.
pub fn build_router(services: Arc<AppServices>) -> Router {
    let auth_state = middleware::AuthState {
        jwt: services.validator.clone(),
        sessions: services.sessions.clone(),
    };

    // Protected routes: require a valid token and a live session.
    let protected = routes::router(services.max_upload_bytes).layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
