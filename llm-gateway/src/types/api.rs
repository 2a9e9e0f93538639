//! Gateway-facing request and response types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

fn default_temperature() -> f64 {
    0.7
}

/// Request body for POST /generate and POST /generate_stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The prompt to generate a response for
    pub prompt: String,

    /// Model name; the configured default is used when absent or empty
    #[serde(default)]
    pub model: Option<String>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Upper bound on generated tokens; `0` means no bound
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Ignored by /generate_stream, which always streams
    #[serde(default)]
    pub stream: bool,
}

impl GenerationRequest {
    /// Create a request with default sampling settings
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: None,
            temperature: default_temperature(),
            max_tokens: None,
            stream: false,
        }
    }
}

/// Response body for POST /generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// Generated text
    pub response: String,

    /// Model that produced it
    pub model: String,

    /// Always true on success
    pub done: bool,
}

/// One event of a /generate_stream response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A fragment of generated text
    Token(String),

    /// Generation finished
    Done { model: String },

    /// Generation failed; nothing follows
    Error(String),
}

impl StreamEvent {
    /// Whether this event ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, StreamEvent::Token(_))
    }

    /// JSON payload carried in the `data:` line
    pub fn payload(&self) -> Value {
        match self {
            StreamEvent::Token(token) => json!({ "token": token }),
            StreamEvent::Done { model } => json!({ "done": true, "model": model }),
            StreamEvent::Error(message) => json!({ "error": message }),
        }
    }
}

/// Response body for GET /health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// `healthy`, `degraded` or `unhealthy`
    pub status: String,

    /// `connected`, `error` or `disconnected`
    pub ollama_status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ollama_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response body for GET /
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub ollama_url: String,
    pub default_model: String,
    pub endpoints: Endpoints,
}

/// Route listing advertised by GET /
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoints {
    pub health: String,
    pub models: String,
    pub generate: String,
    pub generate_stream: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            health: "/health".to_string(),
            models: "/models".to_string(),
            generate: "/generate (POST)".to_string(),
            generate_stream: "/generate_stream (POST)".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: GenerationRequest = serde_json::from_str(r#"{"prompt":"Hello"}"#).unwrap();
        assert_eq!(request, GenerationRequest::new("Hello"));
        assert!((request.temperature - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn test_request_rejects_negative_max_tokens() {
        let result = serde_json::from_str::<GenerationRequest>(r#"{"prompt":"Hi","max_tokens":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_requires_prompt() {
        assert!(serde_json::from_str::<GenerationRequest>(r#"{"model":"m"}"#).is_err());
    }

    #[test]
    fn test_stream_event_payloads() {
        assert_eq!(StreamEvent::Token("Hi".to_string()).payload(), json!({"token": "Hi"}));
        assert_eq!(
            StreamEvent::Done { model: "llama3.2:3b".to_string() }.payload(),
            json!({"done": true, "model": "llama3.2:3b"})
        );
        assert_eq!(StreamEvent::Error("boom".to_string()).payload(), json!({"error": "boom"}));
    }

    #[test]
    fn test_stream_event_terminal() {
        assert!(!StreamEvent::Token("a".to_string()).is_terminal());
        assert!(StreamEvent::Done { model: "m".to_string() }.is_terminal());
        assert!(StreamEvent::Error("e".to_string()).is_terminal());
    }

    #[test]
    fn test_health_report_skips_absent_fields() {
        let report = HealthReport {
            status: "unhealthy".to_string(),
            ollama_status: "disconnected".to_string(),
            ollama_url: None,
            default_model: None,
            error: Some("connection refused".to_string()),
        };

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "status": "unhealthy",
                "ollama_status": "disconnected",
                "error": "connection refused"
            })
        );
    }
}
