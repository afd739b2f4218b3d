//! Splitting an assistant response into a formula and its explanation.
//!
//! The formula-producing prompts ask the model to put the formula on its own
//! line starting with `=`, optionally labelled `Formula:` or wrapped in
//! backticks / a code fence, followed by prose. These functions re-parse the
//! whole accumulated text on every call, so they can run after each streamed
//! token and never carry state between calls.

use regex::Regex;
use std::sync::OnceLock;

/// A response split into its parts.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AIResponseSegments {
    pub formula: Option<String>,
    pub explanation: String,
}

impl AIResponseSegments {
    pub fn parse(raw: &str) -> Self {
        match find_formula(raw) {
            Some((formula, end)) => Self {
                formula: Some(formula.to_string()),
                explanation: clean_explanation(&raw[end..]),
            },
            None => Self {
                formula: None,
                explanation: raw.to_string(),
            },
        }
    }
}

fn formula_line_regex() -> &'static Regex {
    static FORMULA_LINE: OnceLock<Regex> = OnceLock::new();
    FORMULA_LINE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:(?i:formula)[ \t]*:[ \t]*)?`?(=[^\r\n`]*)`?[ \t]*\r?$")
            .expect("formula pattern is valid")
    })
}

fn explanation_label_regex() -> &'static Regex {
    static LABEL: OnceLock<Regex> = OnceLock::new();
    LABEL.get_or_init(|| {
        Regex::new(r"^(?i:explanation)[ \t]*:[ \t]*").expect("label pattern is valid")
    })
}

/// Locate the first formula line; returns the trimmed formula and the byte
/// offset where the line ends.
fn find_formula(raw: &str) -> Option<(&str, usize)> {
    let caps = formula_line_regex().captures(raw)?;
    let formula = caps.get(1)?.as_str().trim();
    let end = caps.get(0)?.end();
    Some((formula, end))
}

fn clean_explanation(rest: &str) -> String {
    let mut rest = rest.trim_start();

    // Closing fence of a fenced formula block
    if let Some(after) = rest.strip_prefix("```") {
        rest = match after.find('\n') {
            Some(newline) => after[newline + 1..].trim_start(),
            None => "",
        };
    }

    explanation_label_regex()
        .replace(rest, "")
        .trim()
        .to_string()
}

/// The formula segment of `raw`, trimmed, or `None` when no formula line has
/// been emitted (yet).
pub fn parse_formula(raw: &str) -> Option<String> {
    find_formula(raw).map(|(formula, _)| formula.to_string())
}

/// Everything after the formula segment, or `raw` unchanged when there is no
/// formula segment.
pub fn parse_explanation(raw: &str) -> String {
    AIResponseSegments::parse(raw).explanation
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_response_is_partitioned() {
        let raw = "=SUM(A1:A10)\nSums the range";
        assert_eq!(parse_formula(raw).as_deref(), Some("=SUM(A1:A10)"));
        assert_eq!(parse_explanation(raw), "Sums the range");
    }

    #[test]
    fn test_no_formula_returns_raw_explanation() {
        let raw = "  This formula adds up column A.\n";
        assert_eq!(parse_formula(raw), None);
        assert_eq!(parse_explanation(raw), raw);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse_formula(""), None);
        assert_eq!(parse_explanation(""), "");
        assert_eq!(AIResponseSegments::parse(""), AIResponseSegments::default());
    }

    #[test]
    fn test_labelled_formula_and_explanation() {
        let raw = "Formula: =AVERAGE(B2:B20)\nExplanation: Averages the scores.";
        let segments = AIResponseSegments::parse(raw);
        assert_eq!(segments.formula.as_deref(), Some("=AVERAGE(B2:B20)"));
        assert_eq!(segments.explanation, "Averages the scores.");
    }

    #[test]
    fn test_fenced_formula() {
        let raw = "Here you go:\n```excel\n=COUNTIF(C:C, \">10\")\n```\nCounts values above ten.";
        let segments = AIResponseSegments::parse(raw);
        assert_eq!(segments.formula.as_deref(), Some("=COUNTIF(C:C, \">10\")"));
        assert_eq!(segments.explanation, "Counts values above ten.");
    }

    #[test]
    fn test_backticked_formula_with_crlf() {
        let raw = "`=MAX(A:A)`\r\nLargest value.\r\n";
        assert_eq!(parse_formula(raw).as_deref(), Some("=MAX(A:A)"));
        assert_eq!(parse_explanation(raw), "Largest value.");
    }

    #[test]
    fn test_equals_inside_prose_is_not_a_formula() {
        let raw = "Set x = 5 and then compare.";
        assert_eq!(parse_formula(raw), None);
        assert_eq!(parse_explanation(raw), raw);
    }

    #[test]
    fn test_growing_prefixes_never_panic() {
        let full = "Formula: `=IF(A1>0, \"pos\", \"neg\")`\n```\nExplanation: Labels the sign of A1.";
        let mut saw_formula = false;
        for (idx, _) in full.char_indices().chain(std::iter::once((full.len(), ' '))) {
            let prefix = &full[..idx];
            let segments = AIResponseSegments::parse(prefix);
            assert_eq!(segments.formula, parse_formula(prefix));
            assert_eq!(segments.explanation, parse_explanation(prefix));
            if segments.formula.is_none() {
                assert_eq!(segments.explanation, prefix);
            } else {
                saw_formula = true;
            }
        }
        assert!(saw_formula);
        assert_eq!(
            parse_formula(full).as_deref(),
            Some("=IF(A1>0, \"pos\", \"neg\")")
        );
        assert_eq!(parse_explanation(full), "Labels the sign of A1.");
    }

    #[test]
    fn test_partial_formula_is_best_effort() {
        assert_eq!(parse_formula("=SUM(A1").as_deref(), Some("=SUM(A1"));
        assert_eq!(parse_explanation("=SUM(A1"), "");
        assert_eq!(parse_formula("Form"), None);
        assert_eq!(parse_explanation("Form"), "Form");
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let raw = "=A1*2\nDoubles A1";
        assert_eq!(AIResponseSegments::parse(raw), AIResponseSegments::parse(raw));
    }
}
