//! Service metadata endpoint.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::state::AppState;
use crate::types::api::{Endpoints, ServiceInfo};

/// Name reported by GET /
pub const SERVICE_NAME: &str = "GPU LLM Server";

/// Service metadata
///
/// GET /
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        ollama_url: state.config.ollama_url.clone(),
        default_model: state.config.default_model.clone(),
        endpoints: Endpoints::default(),
    })
}
