//! Heuristic detection of questions about post-training-cutoff findings.

use regex::Regex;
use std::sync::OnceLock;

const RECENCY_TERMS: &[&str] = &[
    "recent",
    "latest",
    "new study",
    "new research",
    "newly published",
    "this year",
    "last month",
    "just published",
];

fn recent_year_regex() -> &'static Regex {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    YEAR_RE.get_or_init(|| Regex::new(r"\b(202[4-9]|203[0-9])\b").expect("valid year regex"))
}

/// Whether `question` likely needs knowledge newer than the model's training.
///
/// True for a standalone year in 2024-2039 or a recency phrase such as
/// "latest" or "just published".
pub fn detect_novelty(question: &str) -> bool {
    if recent_year_regex().is_match(question) {
        return true;
    }
    let lower = question.to_lowercase();
    RECENCY_TERMS.iter().any(|term| lower.contains(term))
}
