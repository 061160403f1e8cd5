//! The "ask the model" capability consumed by the dispatcher.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Why a single model invocation failed.
///
/// Always recoverable from the batch's point of view: the dispatcher turns it
/// into a failure marker for that record and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvocationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends a prompt to a named model and returns its textual reply.
///
/// Implementations are shared across all dispatcher tasks, so they must be
/// `Send + Sync`. Enforcing a per-call deadline is the implementation's job;
/// the dispatcher applies its own outer timeout as well.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, model: &str, prompt: &str) -> Result<String, InvocationError>;
}
