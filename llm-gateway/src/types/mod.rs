//! API types for the gateway.
//!
//! - `api`: what callers send to and receive from the gateway
//! - `ollama`: what the gateway sends to and receives from Ollama

pub mod api;
pub mod ollama;
