//! Model invokers: HTTP clients that implement the engine's `ModelInvoker` capability.

#[cfg(feature = "http")]
pub mod ollama;

#[cfg(feature = "http")]
pub use ollama::{ClientError, DEFAULT_BASE_URL, OllamaClient};
