//! Error types for the gateway.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Message used whenever the backend exceeds its time budget
pub const TIMEOUT_MESSAGE: &str = "LLM server response time exceeded";

/// Gateway error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Could not reach the Ollama backend
    #[error("Failed to connect to Ollama: {0}")]
    Unreachable(String),

    /// Ollama answered with a non-success status
    #[error("Ollama returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    /// Ollama did not answer in time
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// Ollama answered with something we could not decode
    #[error("Malformed response from Ollama: {0}")]
    MalformedResponse(String),

    /// Request body could not be accepted
    #[error("{message}")]
    InvalidRequest { status: u16, message: String },

    /// Missing or wrong API key
    #[error("Invalid or missing API key")]
    Unauthorized,

    /// Anything else
    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Unreachable(_) => "unreachable",
            GatewayError::BadStatus { .. } => "bad_status",
            GatewayError::Timeout => "timeout",
            GatewayError::MalformedResponse(_) => "malformed_response",
            GatewayError::InvalidRequest { .. } => "invalid_request",
            GatewayError::Unauthorized => "unauthorized",
            GatewayError::Internal(_) => "internal",
        }
    }

    /// HTTP status used when this error ends a non-streaming request
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::BadStatus { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            GatewayError::InvalidRequest { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST)
            }
            GatewayError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Unauthorized => StatusCode::UNAUTHORIZED,
            GatewayError::Unreachable(_)
            | GatewayError::MalformedResponse(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `detail` field of the error body
    pub fn detail(&self) -> String {
        match self {
            GatewayError::BadStatus { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }

    /// Text carried by the error event that ends a token stream
    pub fn stream_message(&self) -> String {
        match self {
            GatewayError::BadStatus { status, .. } => format!("Ollama API error: {}", status),
            other => other.to_string(),
        }
    }

    /// Collapse any backend failure into a generic internal error
    pub fn into_internal(self) -> Self {
        match self {
            GatewayError::BadStatus { status, .. } => {
                GatewayError::Internal(format!("Ollama returned status {}", status))
            }
            GatewayError::Internal(_) => self,
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_connect() {
            GatewayError::Unreachable(err.to_string())
        } else if err.is_decode() {
            GatewayError::MalformedResponse(err.to_string())
        } else {
            GatewayError::Internal(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::MalformedResponse(err.to_string())
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        GatewayError::InvalidRequest {
            status: rejection.status().as_u16(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "detail": self.detail(),
            "error_type": self.kind(),
        }));

        (self.status_code(), body).into_response()
    }
}
