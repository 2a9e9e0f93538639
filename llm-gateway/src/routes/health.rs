//! Health check endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::proxy::BackendHealth;
use crate::state::AppState;
use crate::types::api::HealthReport;

/// Health check endpoint
///
/// GET /health
///
/// Always answers 200; the body says whether Ollama is usable.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let report = match state.backend.probe().await {
        BackendHealth::Healthy => HealthReport {
            status: "healthy".to_string(),
            ollama_status: "connected".to_string(),
            ollama_url: Some(state.config.ollama_url.clone()),
            default_model: Some(state.config.default_model.clone()),
            error: None,
        },
        BackendHealth::Degraded { status } => HealthReport {
            status: "degraded".to_string(),
            ollama_status: "error".to_string(),
            ollama_url: None,
            default_model: None,
            error: Some(format!("Ollama returned status {}", status)),
        },
        BackendHealth::Unhealthy { error } => HealthReport {
            status: "unhealthy".to_string(),
            ollama_status: "disconnected".to_string(),
            ollama_url: None,
            default_model: None,
            error: Some(error),
        },
    };

    Json(report)
}
