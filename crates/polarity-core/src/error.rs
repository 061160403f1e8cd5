use thiserror::Error;

/// Fatal configuration problems, raised before any model invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("worker limit must be at least 1")]
    InvalidWorkerLimit,

    #[error("label vocabulary is empty")]
    EmptyVocabulary,

    #[error("label {0:?} is empty after normalisation")]
    BlankLabel(String),

    #[error("labels {first:?} and {second:?} are duplicates after normalisation")]
    DuplicateLabel { first: String, second: String },

    #[error("label {0:?} collides with the reserved \"unresolved\" marker")]
    ReservedLabel(String),

    #[error("prompt template is empty")]
    EmptyPromptTemplate,

    #[error("model identifier is empty")]
    EmptyModel,
}
