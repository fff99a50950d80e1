//! Score extraction from free-form model replies.

use regex::Regex;
use std::sync::OnceLock;

/// Score used when a reply carries no valid 1-10 token
pub const DEFAULT_SCORE: u8 = 5;

fn score_regex() -> &'static Regex {
    static SCORE_RE: OnceLock<Regex> = OnceLock::new();
    SCORE_RE.get_or_init(|| Regex::new(r"\b(10|[1-9])\b").expect("valid score regex"))
}

/// Extract the first whole-word integer in 1..=10 from `reply`.
///
/// Numbers that are not whole words (the "1" in "15") never match, and `0`
/// never matches. A leading minus sign is not part of the word, so `"-3"`
/// yields 3. Returns [`DEFAULT_SCORE`] when nothing matches.
pub fn parse_score(reply: &str) -> u8 {
    score_regex()
        .find(reply.trim())
        .and_then(|m| m.as_str().parse::<u8>().ok())
        .filter(|score| (1..=10).contains(score))
        .unwrap_or(DEFAULT_SCORE)
}
