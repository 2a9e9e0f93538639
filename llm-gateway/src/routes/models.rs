//! Model listing passthrough.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::error::GatewayError;
use crate::state::AppState;

/// List available models
///
/// GET /models
///
/// Returns Ollama's /api/tags body as-is. Any backend failure is a 500.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Response, GatewayError> {
    debug!("Handling GET /models");

    let body = state.backend.list_models().await.map_err(|e| {
        error!(error = %e, "Failed to list models");
        e.into_internal()
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
