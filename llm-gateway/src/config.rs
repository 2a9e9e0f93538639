//! Gateway configuration.
//!
//! Values are read once at startup from the environment (optionally seeded
//! from a `.env` file) and then passed around as an immutable value.

use std::time::Duration;

/// Default Ollama base URL
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model used when a request does not name one
pub const DEFAULT_MODEL: &str = "exaone3.5:latest";

/// Default listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_PORT: u16 = 8001;

/// Configuration errors
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    /// PORT is not a valid port number
    #[error("Invalid PORT value '{0}'")]
    InvalidPort(String),
}

/// Gateway configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Ollama backend base URL, without trailing slash
    pub ollama_url: String,

    /// Model used when the request omits one
    pub default_model: String,

    /// Host to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Static API key. When set, every route requires it.
    pub api_key: Option<String>,

    /// Reload flag for the launcher
    pub reload: bool,

    /// Timeout for the health probe
    pub health_timeout: Duration,

    /// Timeout for the model listing passthrough
    pub models_timeout: Duration,

    /// Overall timeout for generation calls, streaming included
    pub generate_timeout: Duration,

    /// Connect timeout for every backend call
    pub connect_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_key: None,
            reload: false,
            health_timeout: Duration::from_secs(5),
            models_timeout: Duration::from_secs(10),
            generate_timeout: Duration::from_secs(600),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl GatewayConfig {
    /// Create config from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(raw.clone()))?,
            None => defaults.port,
        };

        Ok(Self {
            ollama_url: lookup("OLLAMA_BASE_URL")
                .map(|url| normalize_url(&url))
                .unwrap_or(defaults.ollama_url),
            default_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.default_model),
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            api_key: lookup("API_KEY").filter(|key| !key.is_empty()),
            reload: lookup("UVICORN_RELOAD")
                .or_else(|| lookup("RELOAD"))
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
            ..defaults
        })
    }

    /// Override the backend URL
    pub fn with_ollama_url(mut self, url: impl AsRef<str>) -> Self {
        self.ollama_url = normalize_url(url.as_ref());
        self
    }

    /// Listen address in `host:port` form
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// Truthy strings accepted for boolean flags
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "t" | "yes" | "y" | "on"
    )
}
