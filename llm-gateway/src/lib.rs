//! LLM Gateway Library
//!
//! A small HTTP front for a local Ollama server. It accepts generation
//! requests, translates them to Ollama's `/api/generate` format, and relays
//! the answer either as one JSON document or as a server-sent-event token
//! stream.
//!
//! Routes:
//! - `GET /`: service metadata
//! - `GET /health`: Ollama connectivity probe (always 200)
//! - `GET /models`: Ollama's model list, verbatim
//! - `POST /generate`: one-shot generation
//! - `POST /generate_stream`: token stream as `text/event-stream`

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod proxy;
pub mod routes;
pub mod state;
pub mod stream;
pub mod types;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use state::AppState;

/// Build the gateway router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/models", get(routes::list_models))
        .route("/generate", post(routes::generate))
        .route("/generate_stream", post(routes::generate_stream))
        // Middleware
        .layer(middleware::from_fn_with_state(state.clone(), auth::require_api_key))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the gateway server.
///
/// This function starts the HTTP server and blocks until it's shut down.
///
/// # Example
/// ```no_run
/// use llm_gateway::{run_server, GatewayConfig};
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let config = GatewayConfig::default().with_ollama_url("http://localhost:11434");
///     run_server(config).await
/// }
/// ```
pub async fn run_server(config: GatewayConfig) -> anyhow::Result<()> {
    info!(
        addr = %config.listen_addr(),
        ollama_url = %config.ollama_url,
        default_model = %config.default_model,
        auth = config.api_key.is_some(),
        "Starting LLM Gateway v{}",
        env!("CARGO_PKG_VERSION")
    );

    let state = Arc::new(AppState::new(config.clone())?);

    // Check Ollama connectivity
    match state.backend.probe().await {
        proxy::BackendHealth::Healthy => info!("Connected to Ollama at {}", config.ollama_url),
        other => {
            warn!(
                "Could not reach Ollama at {} ({:?}). \
                 Gateway will start anyway and report it on /health.",
                config.ollama_url, other
            );
        }
    }

    let app = build_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("LLM Gateway listening on http://{}", addr);
    print_banner(&config);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Print the startup banner
fn print_banner(config: &GatewayConfig) {
    println!();
    println!("==================================================");
    println!("  LLM Gateway v{}", env!("CARGO_PKG_VERSION"));
    println!("==================================================");
    println!("  Listening on:   http://{}", config.listen_addr());
    println!("  Ollama backend: {}", config.ollama_url);
    println!("  Default model:  {}", config.default_model);
    println!(
        "  API key:        {}",
        if config.api_key.is_some() { "required" } else { "disabled" }
    );
    println!();
    println!("  Endpoints:");
    println!("    GET  /              service info");
    println!("    GET  /health        backend health");
    println!("    GET  /models        model list");
    println!("    POST /generate      one-shot generation");
    println!("    POST /generate_stream  SSE token stream");
    println!("==================================================");
    println!();
}
