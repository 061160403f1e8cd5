//! Classification engine: fans prompts out to an LLM and resolves replies to labels.

pub mod dispatcher;
pub mod invoker;
pub mod prompt;
pub mod resolver;

pub use dispatcher::{
    BatchConfig, ClassificationRequest, DEFAULT_CALL_TIMEOUT, DEFAULT_WORKERS, classify_batch,
};
pub use invoker::{InvocationError, ModelInvoker};
pub use prompt::PromptTemplate;
pub use resolver::{AmbiguityPolicy, resolve, resolve_batch, resolve_with};
