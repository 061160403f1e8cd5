//! Text normalisation for comparing model replies against labels.
//!
//! Free-text LLM replies arrive with arbitrary casing, padding, trailing
//! punctuation and line breaks ("  NEUTRAL.  ", "**Positive**\n"). Both the
//! reply and every vocabulary entry are reduced to the same comparable form
//! before matching.

/// Normalise text into its comparable form.
///
/// # Algorithm
///
/// 1. Lowercase (Unicode-aware)
/// 2. Collapse every run of whitespace into a single ASCII space
/// 3. Strip leading and trailing characters that are not alphanumeric
///
/// Input: `"  NEUTRAL.  "` → `"neutral"`
/// Input: `"\"Very   Positive!\""` → `"very positive"`
pub fn normalize(s: &str) -> String {
    let lowered = s.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases() {
        assert_eq!(normalize("Positive"), "positive");
        assert_eq!(normalize("NEGATIVE"), "negative");
    }

    #[test]
    fn trims_whitespace_and_punctuation() {
        assert_eq!(normalize("  NEUTRAL.  "), "neutral");
        assert_eq!(normalize("**positive**"), "positive");
        assert_eq!(normalize("\"negative\"\n"), "negative");
        assert_eq!(normalize("(unrelated)!"), "unrelated");
    }

    #[test]
    fn collapses_inner_whitespace() {
        assert_eq!(normalize("very \t  positive"), "very positive");
        assert_eq!(normalize("line one\nline two"), "line one line two");
    }

    #[test]
    fn keeps_inner_punctuation() {
        assert_eq!(normalize("Sentiment: positive."), "sentiment: positive");
        assert_eq!(normalize("non-negative"), "non-negative");
    }

    #[test]
    fn empty_and_symbol_only_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("...!?"), "");
    }

    #[test]
    fn unicode_casefold() {
        assert_eq!(normalize("  ÉNERGIE "), "énergie");
    }

    #[test]
    fn idempotent() {
        for s in ["  NEUTRAL.  ", "Very  Positive!", "", "a-b"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
        }
    }
}
