//! Ollama API types.
//!
//! Only the subset of `/api/generate` the gateway forwards. See
//! https://github.com/ollama/ollama/blob/main/docs/api.md

use serde::{Deserialize, Serialize};

/// Request body for POST /api/generate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model name
    pub model: String,

    /// The prompt to generate a response for
    pub prompt: String,

    /// Stream newline-delimited JSON chunks instead of one object
    pub stream: bool,

    /// Model-specific options
    pub options: ModelOptions,
}

/// Model-specific options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Sampling temperature
    pub temperature: f64,

    /// Maximum number of tokens to predict
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Response from POST /api/generate.
///
/// With `stream: true` every NDJSON line has this shape; the last one
/// carries `done: true`. Fields Ollama adds beyond these are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateResponse {
    /// Generated text (streaming: one fragment, final: complete)
    #[serde(default)]
    pub response: String,

    /// Whether generation is complete
    #[serde(default)]
    pub done: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_num_predict_omitted_when_unset() {
        let request = GenerateRequest {
            model: "llama3.2:3b".to_string(),
            prompt: "Write a haiku".to_string(),
            stream: false,
            options: ModelOptions { temperature: 0.5, num_predict: None },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "llama3.2:3b",
                "prompt": "Write a haiku",
                "stream": false,
                "options": {"temperature": 0.5}
            })
        );
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let chunk: GenerateResponse = serde_json::from_str(r#"{"done":true}"#).unwrap();
        assert!(chunk.done);
        assert!(chunk.response.is_empty());

        let chunk: GenerateResponse = serde_json::from_str(
            r#"{"model":"m","created_at":"2024-01-01T00:00:00Z","response":"Hi","done":false}"#,
        )
        .unwrap();
        assert_eq!(chunk.response, "Hi");
        assert!(!chunk.done);
    }
}
