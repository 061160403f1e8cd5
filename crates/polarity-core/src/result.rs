//! Per-record outcomes of a classification batch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rendered value of [`ResolvedLabel::Unresolved`].
pub const UNRESOLVED: &str = "unresolved";

/// The model's reply for one record, or a marker that the call failed.
///
/// Failures keep their slot so a batch never loses index alignment with its
/// input records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum RawResponse {
    /// Unmodified text returned by the model.
    Reply(String),
    /// The invocation failed; holds the error text.
    Failed(String),
}

impl RawResponse {
    /// Reply text, or the empty string for a failed call.
    pub fn text(&self) -> &str {
        match self {
            Self::Reply(text) => text,
            Self::Failed(_) => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Error text for a failed call.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Reply(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

impl fmt::Display for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reply(text) => f.write_str(text),
            Self::Failed(reason) => write!(f, "ERROR: {reason}"),
        }
    }
}

/// One vocabulary entry, or `Unresolved` when the reply matched none (or
/// more than one) of them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedLabel {
    Label(String),
    Unresolved,
}

impl ResolvedLabel {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Label(label) => label,
            Self::Unresolved => UNRESOLVED,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Label(_))
    }
}

impl fmt::Display for ResolvedLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extra detail retained per record when a batch runs in debug mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDiagnostics {
    /// The exact prompt sent to the model.
    pub prompt: String,
    /// Wall-clock time from permit acquisition to reply (or failure).
    pub latency_ms: u64,
    pub error: Option<String>,
}

/// Outcome for a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemOutcome {
    pub response: RawResponse,
    /// Present only in debug mode.
    pub diagnostics: Option<ItemDiagnostics>,
}

/// Outcomes aligned 1:1 with the input records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    items: Vec<ItemOutcome>,
}

impl BatchResult {
    pub fn new(items: Vec<ItemOutcome>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ItemOutcome> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemOutcome> {
        self.items.iter()
    }

    /// Raw responses in input order.
    pub fn responses(&self) -> impl ExactSizeIterator<Item = &RawResponse> {
        self.items.iter().map(|item| &item.response)
    }

    /// Indices of records whose invocation failed (candidates for re-query).
    pub fn failed_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.response.is_failed())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.response.is_failed())
            .count()
    }

    pub fn into_items(self) -> Vec<ItemOutcome> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(response: RawResponse) -> ItemOutcome {
        ItemOutcome {
            response,
            diagnostics: None,
        }
    }

    #[test]
    fn failed_response_renders_error_tag() {
        let r = RawResponse::Failed("connection refused".into());
        assert_eq!(r.to_string(), "ERROR: connection refused");
        assert_eq!(r.text(), "");
        assert_eq!(r.error(), Some("connection refused"));
        assert!(r.is_failed());
    }

    #[test]
    fn reply_renders_verbatim() {
        let r = RawResponse::Reply("  Positive.\n".into());
        assert_eq!(r.to_string(), "  Positive.\n");
        assert_eq!(r.text(), "  Positive.\n");
        assert!(r.error().is_none());
    }

    #[test]
    fn unresolved_renders_sentinel() {
        assert_eq!(ResolvedLabel::Unresolved.to_string(), "unresolved");
        assert_eq!(ResolvedLabel::Label("neutral".into()).as_str(), "neutral");
        assert!(!ResolvedLabel::Unresolved.is_resolved());
    }

    #[test]
    fn failed_indices_reports_positions() {
        let batch = BatchResult::new(vec![
            outcome(RawResponse::Reply("positive".into())),
            outcome(RawResponse::Failed("timeout".into())),
            outcome(RawResponse::Reply("negative".into())),
            outcome(RawResponse::Failed("500".into())),
        ]);
        assert_eq!(batch.len(), 4);
        assert_eq!(batch.failed_indices(), vec![1, 3]);
        assert_eq!(batch.failed_count(), 2);
        let texts: Vec<&str> = batch.responses().map(|r| r.text()).collect();
        assert_eq!(texts, vec!["positive", "", "negative", ""]);
    }

    #[test]
    fn diagnostics_json_shape() {
        let diag = ItemDiagnostics {
            prompt: "Classify: hello".into(),
            latency_ms: 42,
            error: None,
        };
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["prompt"], "Classify: hello");
        assert_eq!(json["latency_ms"], 42);
        assert!(json["error"].is_null());
    }

    #[test]
    fn raw_response_json_is_tagged() {
        let json = serde_json::to_string(&RawResponse::Failed("boom".into())).unwrap();
        assert_eq!(json, r#"{"kind":"failed","value":"boom"}"#);
        let parsed: RawResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, RawResponse::Failed("boom".into()));
    }
}
