//! Conversion from gateway requests to Ollama's request format.

use crate::types::api::GenerationRequest;
use crate::types::ollama;
use tracing::debug;

/// Pick the model for a request: its own if non-empty, else the default
pub fn resolve_model(request: &GenerationRequest, default_model: &str) -> String {
    request
        .model
        .as_deref()
        .filter(|model| !model.is_empty())
        .unwrap_or(default_model)
        .to_string()
}

/// Build the Ollama /api/generate payload
///
/// A `max_tokens` of zero is treated as unset.
pub fn to_ollama_generate(
    request: &GenerationRequest,
    model: &str,
    stream: bool,
) -> ollama::GenerateRequest {
    debug!(model = %model, stream, "Converting request to Ollama format");

    ollama::GenerateRequest {
        model: model.to_string(),
        prompt: request.prompt.clone(),
        stream,
        options: ollama::ModelOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens.filter(|&n| n > 0),
        },
    }
}
