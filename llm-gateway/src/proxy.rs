//! Client for the Ollama backend.
//!
//! Every gateway route makes exactly one call through this client. Nothing
//! is retried; failures are classified into [`GatewayError`] and handed back
//! to the route.

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::types::ollama::{GenerateRequest, GenerateResponse};
use bytes::Bytes;
use futures::Stream;
use reqwest::{Client, StatusCode};
use serde::de::IgnoredAny;
use std::pin::Pin;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

/// Type alias for streaming response
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Outcome of a backend health probe
#[derive(Debug, Clone, PartialEq)]
pub enum BackendHealth {
    /// Ollama answered 200
    Healthy,
    /// Ollama answered, but not with 200
    Degraded { status: u16 },
    /// Ollama could not be reached in time
    Unhealthy { error: String },
}

/// Ollama backend client
#[derive(Clone)]
pub struct OllamaClient {
    /// HTTP client, shared so connections can be reused
    client: Client,
    /// Ollama base URL
    base_url: String,
    health_timeout: Duration,
    models_timeout: Duration,
    generate_timeout: Duration,
}

impl OllamaClient {
    /// Create a new Ollama client
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        info!(url = %config.ollama_url, "Creating Ollama client");

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| GatewayError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.ollama_url.clone(),
            health_timeout: config.health_timeout,
            models_timeout: config.models_timeout,
            generate_timeout: config.generate_timeout,
        })
    }

    /// Get the Ollama base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Check whether Ollama answers its model listing endpoint
    #[instrument(skip(self))]
    pub async fn probe(&self) -> BackendHealth {
        let url = self.url("/api/tags");
        debug!(url = %url, "Checking Ollama health");

        match self.client.get(&url).timeout(self.health_timeout).send().await {
            Ok(response) if response.status() == StatusCode::OK => BackendHealth::Healthy,
            Ok(response) => {
                let status = response.status();
                error!(status = %status, "Ollama health probe returned error status");
                BackendHealth::Degraded { status: status.as_u16() }
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to Ollama");
                BackendHealth::Unhealthy { error: e.to_string() }
            }
        }
    }

    /// List available models, returning Ollama's JSON body untouched
    #[instrument(skip(self))]
    pub async fn list_models(&self) -> Result<Bytes, GatewayError> {
        let url = self.url("/api/tags");
        debug!(url = %url, "Listing models");

        let response = self.client.get(&url).timeout(self.models_timeout).send().await?;

        // Callers only report the status code, so the error body is not read
        let status = response.status();
        if status != StatusCode::OK {
            debug!(status = %status, "Model listing returned error status");
            return Err(GatewayError::BadStatus { status: status.as_u16(), body: String::new() });
        }

        let body = response.bytes().await?;
        serde_json::from_slice::<IgnoredAny>(&body)?;
        Ok(body)
    }

    /// Send a generate request (non-streaming)
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn generate(
        &self,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, GatewayError> {
        let url = self.url("/api/generate");
        debug!(url = %url, "Sending generate request");

        let response = self
            .client
            .post(&url)
            .timeout(self.generate_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::BadStatus { status: status.as_u16(), body });
        }

        let result: GenerateResponse = response.json().await?;
        debug!(chars = result.response.len(), "Generate complete");
        Ok(result)
    }

    /// Send a generate request with streaming
    ///
    /// The returned stream owns the backend connection; dropping it closes
    /// the request.
    #[instrument(skip(self, request), fields(model = %request.model))]
    pub async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<ByteStream, GatewayError> {
        let url = self.url("/api/generate");
        debug!(url = %url, "Sending streaming generate request");

        let response = self
            .client
            .post(&url)
            .timeout(self.generate_timeout)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(GatewayError::BadStatus { status: status.as_u16(), body: String::new() });
        }

        Ok(Box::pin(response.bytes_stream()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new(&GatewayConfig::default()).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");
        assert_eq!(client.url("/api/tags"), "http://127.0.0.1:11434/api/tags");
    }

    #[test]
    fn test_client_with_custom_url() {
        let config = GatewayConfig::default().with_ollama_url("http://192.168.1.100:11434/");
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.base_url(), "http://192.168.1.100:11434");
    }

    #[tokio::test]
    async fn test_probe_unreachable_backend() {
        // Nothing listens on the discard port.
        let config = GatewayConfig::default().with_ollama_url("http://127.0.0.1:9");
        let client = OllamaClient::new(&config).unwrap();

        match client.probe().await {
            BackendHealth::Unhealthy { error } => assert!(!error.is_empty()),
            other => panic!("expected unhealthy, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_models_bad_status_skips_body() {
        let backend = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
            .mount(&backend)
            .await;

        let client = OllamaClient::new(&GatewayConfig::default().with_ollama_url(backend.uri())).unwrap();
        match client.list_models().await {
            Err(GatewayError::BadStatus { status, body }) => {
                assert_eq!(status, 503);
                assert!(body.is_empty());
            }
            other => panic!("expected bad status, got {:?}", other),
        }
    }
}
