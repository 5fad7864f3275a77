use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use stockscan_auth::JwtValidator;

use crate::app::errors::ApiError;
use crate::context::UserContext;
use crate::sessions::SessionRegistry;

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub sessions: Arc<SessionRegistry>,
}

/// Validates the bearer token and requires its session to still be live.
///
/// On success the request carries a [`UserContext`] and the caller's
/// `Arc<UserSession>` as extensions.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let now = Utc::now();

    let Some(token) = extract_bearer(req.headers()) else {
        return ApiError::Unauthorized.into_response();
    };

    let claims = match state.jwt.validate(token, now) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(error = %err, "rejected bearer token");
            return ApiError::Unauthorized.into_response();
        }
    };

    let Some(session) = state.sessions.get(claims.sid, now) else {
        tracing::debug!(session_id = %claims.sid, "token refers to an ended session");
        return ApiError::Unauthorized.into_response();
    };

    match session.current_user() {
        Some(user) if user.user_id == claims.sub => {}
        _ => return ApiError::Unauthorized.into_response(),
    }

    req.extensions_mut()
        .insert(UserContext::new(claims.sub, claims.sid, claims.email));
    req.extensions_mut().insert(session);

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_tokens_only() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Some("abc.def"));
        assert_eq!(extract_bearer(&headers("Basic abc")), None);
        assert_eq!(extract_bearer(&headers("Bearer   ")), None);
        assert_eq!(extract_bearer(&HeaderMap::new()), None);
    }
}
