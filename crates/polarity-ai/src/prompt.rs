//! Prompt templates with a single insertion point for the record text.
//!
//! Placeholders:
//! - `{text}`: the record's combined column text
//! - `{choices}`: the label vocabulary, joined with `", "`
//!
//! Rendering is a single left-to-right scan, so placeholder-like sequences
//! inside the record itself are never expanded.

use polarity_core::{ConfigError, LabelVocabulary};

const TEXT_SLOT: &str = "{text}";
const CHOICES_SLOT: &str = "{choices}";

/// A validated, non-empty prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    raw: String,
    has_text_slot: bool,
}

impl PromptTemplate {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(ConfigError::EmptyPromptTemplate);
        }
        let has_text_slot = raw.contains(TEXT_SLOT);
        Ok(Self { raw, has_text_slot })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Render the prompt for one record.
    ///
    /// Without a `{text}` placeholder, the record is appended after a blank line.
    pub fn render(&self, record: &str, vocabulary: &LabelVocabulary) -> String {
        let choices = vocabulary.joined();
        let mut out = String::with_capacity(self.raw.len() + record.len() + choices.len());
        let mut rest = self.raw.as_str();

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(TEXT_SLOT) {
                out.push_str(record);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(CHOICES_SLOT) {
                out.push_str(&choices);
                rest = after;
            } else {
                out.push('{');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);

        if !self.has_text_slot {
            out.push_str("\n\n");
            out.push_str(record);
        }
        out
    }
}
