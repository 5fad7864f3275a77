use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use stockscan_ai::AiError;
use stockscan_auth::{CredentialError, IdentityError, TokenError};
use stockscan_infra::{ExportError, ServiceError};

/// Handler-level error; every variant renders as
/// `{"error": code, "message": msg}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Credentials(#[from] CredentialError),

    #[error("authentication required")]
    Unauthorized,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("No file uploaded")]
    MissingFile,

    #[error("{0}")]
    UnsupportedMedia(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("{0}")]
    InvalidExport(#[from] ExportError),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Error processing the image")]
    Scan(#[source] AiError),

    #[error("inventory store unavailable")]
    Store(#[source] ServiceError),

    #[error("identity provider unavailable")]
    Identity(#[source] IdentityError),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) | ApiError::Credentials(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::EmailTaken => (StatusCode::CONFLICT, "email_taken"),
            ApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file"),
            ApiError::UnsupportedMedia(_) => (StatusCode::BAD_REQUEST, "unsupported_media"),
            ApiError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            ApiError::InvalidExport(_) => (StatusCode::BAD_REQUEST, "invalid_inventory"),
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, "method_not_allowed"),
            ApiError::Scan(_) => (StatusCode::INTERNAL_SERVER_ERROR, "scan_failed"),
            ApiError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "store_error"),
            ApiError::Identity(_) => (StatusCode::SERVICE_UNAVAILABLE, "identity_unavailable"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::EmailTaken => ApiError::EmailTaken,
            IdentityError::InvalidCredentials => ApiError::InvalidCredentials,
            IdentityError::Unavailable(_) => {
                tracing::error!(error = %err, "identity provider call failed");
                ApiError::Identity(err)
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(e) => ApiError::Validation(e.to_string()),
            ServiceError::Store(_) => {
                tracing::error!(error = %err, "inventory store call failed");
                ApiError::Store(err)
            }
        }
    }
}

impl From<AiError> for ApiError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::InvalidInput(msg) => ApiError::UnsupportedMedia(msg),
            other => {
                tracing::error!(error = %other, "image scan failed");
                ApiError::Scan(other)
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Signing(msg) => ApiError::Internal(msg),
            _ => ApiError::Unauthorized,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        json_error(status, code, self.to_string())
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub type ApiResult<T> = Result<T, ApiError>;
