//! Reduce a free-text model reply to exactly one vocabulary label.
//!
//! Both the reply and each label are normalised first. An exact match wins
//! outright; otherwise the reply must contain exactly one label as a
//! contiguous substring. Zero matches, or several, resolve to
//! [`ResolvedLabel::Unresolved`] unless the caller opts into
//! [`AmbiguityPolicy::FirstDeclared`].

use polarity_core::{BatchResult, LabelVocabulary, ResolvedLabel, normalize};

/// What to do when a reply contains more than one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityPolicy {
    /// Mark the reply unresolved so it can be reviewed.
    #[default]
    Unresolved,
    /// Pick the contained label declared earliest in the vocabulary.
    FirstDeclared,
}

/// Resolve one reply with the default (conservative) ambiguity policy.
pub fn resolve(raw: &str, vocabulary: &LabelVocabulary) -> ResolvedLabel {
    resolve_with(raw, vocabulary, AmbiguityPolicy::default())
}

/// Resolve one reply. Never panics; empty input is `Unresolved`.
pub fn resolve_with(
    raw: &str,
    vocabulary: &LabelVocabulary,
    policy: AmbiguityPolicy,
) -> ResolvedLabel {
    let reply = normalize(raw);
    if reply.is_empty() {
        return ResolvedLabel::Unresolved;
    }

    if let Some(label) = vocabulary.iter().find(|l| l.normalized() == reply) {
        return ResolvedLabel::Label(label.as_str().to_string());
    }

    let mut contained = vocabulary
        .iter()
        .filter(|l| reply.contains(l.normalized()));

    match (contained.next(), contained.next(), policy) {
        (Some(only), None, _) => ResolvedLabel::Label(only.as_str().to_string()),
        (Some(first), Some(_), AmbiguityPolicy::FirstDeclared) => {
            ResolvedLabel::Label(first.as_str().to_string())
        }
        _ => ResolvedLabel::Unresolved,
    }
}

/// Resolve every outcome of a batch, in order. Failed invocations are `Unresolved`.
pub fn resolve_batch(
    result: &BatchResult,
    vocabulary: &LabelVocabulary,
    policy: AmbiguityPolicy,
) -> Vec<ResolvedLabel> {
    result
        .responses()
        .map(|response| {
            if response.is_failed() {
                ResolvedLabel::Unresolved
            } else {
                resolve_with(response.text(), vocabulary, policy)
            }
        })
        .collect()
}
