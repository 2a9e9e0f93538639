//! LLM Gateway - HTTP/SSE front for a local Ollama server.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start with defaults (0.0.0.0:8001, Ollama at 127.0.0.1:11434)
//! llm-gateway
//!
//! # Custom configuration
//! OLLAMA_BASE_URL=http://192.168.1.100:11434 PORT=9000 llm-gateway
//! llm-gateway --port 9000 --model llama3.2:3b
//! ```
//!
//! Settings are read from the environment, seeded from `.env` when one
//! exists; command-line flags win over both.

use clap::Parser;
use llm_gateway::{run_server, GatewayConfig};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "llm-gateway")]
#[command(version)]
#[command(about = "HTTP/SSE gateway for a local Ollama server", long_about = None)]
struct Cli {
    /// Host to bind (env: HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to bind (env: PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Ollama base URL (env: OLLAMA_BASE_URL)
    #[arg(long)]
    ollama_url: Option<String>,

    /// Default model (env: OLLAMA_MODEL)
    #[arg(short, long)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(self, mut config: GatewayConfig) -> GatewayConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = self.ollama_url {
            config = config.with_ollama_url(url);
        }
        if let Some(model) = self.model {
            config.default_model = model;
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    let default_filter = if cli.verbose {
        "llm_gateway=debug,tower_http=debug"
    } else {
        "llm_gateway=info,tower_http=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Ignoring unreadable .env file");
        }
    }

    // Load configuration
    let config = cli.apply(GatewayConfig::from_env()?);

    if config.reload {
        warn!("Reload flag is set, but a compiled binary cannot reload itself; restart to pick up changes");
    }

    run_server(config).await
}
