//! Optional static API key check.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;

use crate::error::GatewayError;
use crate::state::AppState;

/// Reject requests that do not present the configured API key.
///
/// The key is accepted as `Authorization: Bearer <key>` or `X-API-Key: <key>`.
/// Without a configured key every request passes.
pub async fn require_api_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, GatewayError> {
    if let Some(expected) = state.config.api_key.as_deref() {
        let accepted = presented_key(request.headers())
            .is_some_and(|key| keys_match(key.as_bytes(), expected.as_bytes()));
        if !accepted {
            warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            return Err(GatewayError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}

/// Compare two keys in time that depends only on their length
fn keys_match(presented: &[u8], expected: &[u8]) -> bool {
    if presented.len() != expected.len() {
        return false;
    }
    presented.iter().zip(expected).fold(0u8, |acc, (a, b)| acc | (a ^ b)) == 0
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(value);
    }

    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer secret"));
        assert_eq!(presented_key(&headers), Some("secret"));
    }

    #[test]
    fn test_x_api_key() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));
        assert_eq!(presented_key(&headers), Some("secret"));
    }

    #[test]
    fn test_keys_match() {
        assert!(keys_match(b"secret", b"secret"));
        assert!(!keys_match(b"secreT", b"secret"));
        assert!(!keys_match(b"secret2", b"secret"));
        assert!(!keys_match(b"", b"secret"));
    }

    #[test]
    fn test_non_bearer_authorization_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic c2VjcmV0"));
        assert_eq!(presented_key(&headers), None);
        assert_eq!(presented_key(&HeaderMap::new()), None);
    }
}
