//! Session authentication middleware.
//!
//! Validates the bearer session token issued by the sign-in service and
//! stores the authenticated user in request extensions.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use shared::session::SessionKeys;

/// Authenticated user information extracted from the session token.
#[derive(Debug, Clone)]
pub struct UserAuth {
    /// User ID from the token subject claim.
    pub user_id: Uuid,
    /// Session ID (jti).
    pub jti: String,
}

impl UserAuth {
    /// Validates a session token and returns the authenticated user.
    pub fn validate(keys: &SessionKeys, token: &str) -> Result<Self, ApiError> {
        let claims = keys.validate(token)?;
        Ok(UserAuth {
            user_id: claims.user_id()?,
            jti: claims.jti,
        })
    }

    /// Reads and validates the `Authorization: Bearer` header.
    pub fn from_headers(keys: &SessionKeys, headers: &HeaderMap) -> Result<Self, ApiError> {
        let header = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        Self::validate(keys, token)
    }
}

/// Middleware that requires a valid session token.
pub async fn require_user_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match UserAuth::from_headers(&state.session_keys, req.headers()) {
        Ok(auth) => {
            req.extensions_mut().insert(auth);
            next.run(req).await
        }
        Err(e) => {
            tracing::debug!(error = %e, "Session validation failed");
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn keys() -> SessionKeys {
        SessionKeys::new("middleware-test-secret", 0).unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_from_headers_valid() {
        let keys = keys();
        let user_id = Uuid::new_v4();
        let (token, jti) = keys.issue(user_id, 60).unwrap();

        let auth = UserAuth::from_headers(&keys, &headers(&format!("Bearer {}", token))).unwrap();
        assert_eq!(auth.user_id, user_id);
        assert_eq!(auth.jti, jti);
    }

    #[test]
    fn test_from_headers_missing() {
        let result = UserAuth::from_headers(&keys(), &HeaderMap::new());
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn test_from_headers_wrong_scheme() {
        let result = UserAuth::from_headers(&keys(), &headers("Basic abc"));
        assert!(matches!(result, Err(ApiError::Unauthorized(msg)) if msg.contains("format")));
    }

    #[test]
    fn test_from_headers_expired() {
        let keys = keys();
        let (token, _) = keys.issue(Uuid::new_v4(), -120).unwrap();
        let result = UserAuth::from_headers(&keys, &headers(&format!("Bearer {}", token)));
        assert!(matches!(result, Err(ApiError::Unauthorized(msg)) if msg.contains("expired")));
    }
}
