pub mod error;
pub mod normalize;
pub mod result;
pub mod vocabulary;

pub use error::ConfigError;
pub use normalize::normalize;
pub use result::{BatchResult, ItemDiagnostics, ItemOutcome, RawResponse, ResolvedLabel, UNRESOLVED};
pub use vocabulary::{Label, LabelVocabulary};
