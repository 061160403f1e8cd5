//! The caller-supplied set of canonical labels.
//!
//! A vocabulary is declared once per run (e.g. `positive,negative,neutral,unrelated`)
//! and shared read-only by every dispatcher task and by the resolver. Declaration
//! order matters: it is the priority order for the first-declared tie-break.

use std::sync::Arc;

use tracing::debug;

use crate::error::ConfigError;
use crate::normalize::normalize;
use crate::result::UNRESOLVED;

/// A single vocabulary entry: the declared spelling plus its normalised form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    canonical: String,
    normalized: String,
}

impl Label {
    /// The label exactly as declared (trimmed).
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The label in comparable form (see [`normalize`]).
    pub fn normalized(&self) -> &str {
        &self.normalized
    }
}

/// Ordered, non-empty set of labels, unique after normalisation.
///
/// Cloning is cheap: entries live behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelVocabulary {
    labels: Arc<[Label]>,
}

impl LabelVocabulary {
    /// Build a vocabulary from declared labels.
    ///
    /// Fails on an empty sequence, a label that normalises to nothing, a label
    /// spelled like the `unresolved` marker, or two labels that collide after
    /// normalisation (`"Positive"` vs `"positive."`).
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<Label> = Vec::new();

        for raw in labels {
            let canonical = raw.as_ref().trim().to_string();
            let normalized = normalize(&canonical);
            if normalized.is_empty() {
                return Err(ConfigError::BlankLabel(canonical));
            }
            if normalized == UNRESOLVED {
                return Err(ConfigError::ReservedLabel(canonical));
            }
            if let Some(existing) = out.iter().find(|l| l.normalized == normalized) {
                return Err(ConfigError::DuplicateLabel {
                    first: existing.canonical.clone(),
                    second: canonical,
                });
            }
            out.push(Label {
                canonical,
                normalized,
            });
        }

        if out.is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }

        debug!(count = out.len(), "built label vocabulary");
        Ok(Self {
            labels: out.into(),
        })
    }

    /// Build a vocabulary from a comma-separated list such as
    /// `"positive, negative,neutral"`.
    pub fn parse_list(list: &str) -> Result<Self, ConfigError> {
        if list.trim().is_empty() {
            return Err(ConfigError::EmptyVocabulary);
        }
        Self::new(list.split(','))
    }

    /// Iterate over labels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Look up a label by declaration index.
    pub fn get(&self, index: usize) -> Option<&Label> {
        self.labels.get(index)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a constructed vocabulary.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Declared labels joined with `", "`, for inclusion in prompts.
    pub fn joined(&self) -> String {
        self.labels
            .iter()
            .map(|l| l.canonical.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
