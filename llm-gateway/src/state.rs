//! Application state for the gateway.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::proxy::OllamaClient;

/// Application state shared across all handlers
///
/// Read-only after construction.
pub struct AppState {
    /// Ollama backend client
    pub backend: OllamaClient,

    /// Configuration
    pub config: GatewayConfig,
}

impl AppState {
    /// Create new application state
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self { backend: OllamaClient::new(&config)?, config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_uses_config_url() {
        let config = GatewayConfig::default().with_ollama_url("http://ollama:11434");
        let state = AppState::new(config).unwrap();
        assert_eq!(state.backend.base_url(), "http://ollama:11434");
        assert_eq!(state.config.default_model, "exaone3.5:latest");
    }
}
