//! Generation endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName},
    response::{
        sse::{Event, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{future, stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tracing::{error, info};

use crate::convert::{resolve_model, to_ollama_generate};
use crate::error::GatewayError;
use crate::state::AppState;
use crate::stream::relay;
use crate::types::api::{GenerationRequest, GenerationResult, StreamEvent};

/// Generate a completion in one piece
///
/// POST /generate
pub async fn generate(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, GatewayError> {
    let Json(request) = body?;
    let model = resolve_model(&request, &state.config.default_model);
    info!(model = %model, prompt_len = request.prompt.len(), "Handling POST /generate");

    let payload = to_ollama_generate(&request, &model, false);
    let response = state.backend.generate(&payload).await.map_err(|e| {
        error!(error = %e, model = %model, "Generation failed");
        e
    })?;

    Ok(Json(GenerationResult { response: response.response, model, done: true }))
}

/// Generate a completion as server-sent events
///
/// POST /generate_stream
///
/// The `stream` flag of the request is ignored. Once the body is accepted,
/// failures are reported as a single error event and the HTTP status is 200.
/// A body that cannot be decoded gets the regular JSON error response.
pub async fn generate_stream(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Response, GatewayError> {
    let Json(request) = body?;
    let model = resolve_model(&request, &state.config.default_model);
    info!(model = %model, prompt_len = request.prompt.len(), "Handling POST /generate_stream");

    let payload = to_ollama_generate(&request, &model, true);
    let events = match state.backend.generate_stream(&payload).await {
        Ok(bytes) => relay(bytes, model).boxed(),
        Err(e) => {
            error!(error = %e, model = %model, "Streaming generation failed");
            stream::once(future::ready(StreamEvent::Error(e.stream_message()))).boxed()
        }
    };

    let sse = Sse::new(events.map(|event| Ok::<_, Infallible>(to_sse_event(&event))));

    Ok((
        [
            (header::CACHE_CONTROL, "no-cache"),
            (HeaderName::from_static("x-accel-buffering"), "no"),
        ],
        sse,
    )
        .into_response())
}

fn to_sse_event(event: &StreamEvent) -> Event {
    Event::default().data(event.payload().to_string())
}

