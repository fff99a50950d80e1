//! Turning a natural-language question into a literature search query.

use crate::utils::take_chars;

const MAX_QUERY_CHARS: usize = 150;

/// Leading phrases that carry no search value, most specific first
const PREAMBLES: &[&str] = &[
    "According to a 2025 meta-analysis,",
    "According to a 2025 systematic review,",
    "According to a 2025 RCT,",
    "According to a 2025 study,",
    "According to 2025 studies,",
    "Based on a 2025 meta-analysis,",
    "Based on a 2025 RCT,",
    "Based on 2025 evidence,",
    "Based on 2025 studies,",
    "According to a",
    "Based on a",
    "Based on",
];

const QUESTION_WORDS: &[&str] = &["does ", "Does ", "do ", "Do ", "is ", "Is ", "can ", "Can "];

/// Clean a question up for search.
///
/// Removes known preambles and one leading interrogative word, drops a
/// trailing `?`, collapses whitespace and caps the result at 150 characters.
pub fn expand_query(question: &str) -> String {
    let mut q = question.to_string();
    for preamble in PREAMBLES {
        q = q.replacen(preamble, "", 1);
        q = q.replacen(&preamble.to_lowercase(), "", 1);
    }

    let mut q = q.trim();
    if let Some(rest) = QUESTION_WORDS.iter().find_map(|w| q.strip_prefix(w)) {
        q = rest;
    }
    let q = q.strip_suffix('?').unwrap_or(q);

    let collapsed = q.split_whitespace().collect::<Vec<_>>().join(" ");
    take_chars(&collapsed, MAX_QUERY_CHARS)
}
