//! HTTP route handlers for the gateway.
//!
//! - `info`: service metadata
//! - `health`: backend connectivity probe
//! - `models`: model listing passthrough
//! - `generate`: synchronous and streaming generation

pub mod generate;
pub mod health;
pub mod info;
pub mod models;

// Re-export handlers for convenience
pub use generate::{generate, generate_stream};
pub use health::health;
pub use info::root;
pub use models::list_models;
