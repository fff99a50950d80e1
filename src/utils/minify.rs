//! Abstract minification: keep the highest-signal sentences under a budget.

use regex::Regex;
use std::sync::OnceLock;

use super::text::take_chars;

/// Sentences shorter than this are treated as fragments and dropped
const MIN_SENTENCE_CHARS: usize = 20;

/// Terms that tend to appear in findings and conclusions
const KEY_TERMS: &[&str] = &[
    "conclusion",
    "result",
    "found",
    "showed",
    "demonstrated",
    "significant",
    "effective",
    "improved",
    "reduced",
    "increased",
    "associated",
    "compared",
    "outcome",
    "accuracy",
    "sensitivity",
    "specificity",
    "pooled",
    "meta-analysis",
];

struct Patterns {
    sentence_end: Regex,
    label: Regex,
    statistic: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| Patterns {
        sentence_end: Regex::new(r"[.!?]+\s+").expect("valid sentence regex"),
        label: Regex::new(r"(?i)^(results?|conclusions?|findings?)\s*:")
            .expect("valid label regex"),
        statistic: Regex::new(r"[0-9]+%|[0-9]+\.[0-9]+|95%\s*CI|\bp\s*[<=]")
            .expect("valid statistic regex"),
    })
}

fn score_sentence(sentence: &str) -> u32 {
    let p = patterns();
    let lower = sentence.to_lowercase();

    let mut score = KEY_TERMS.iter().filter(|term| lower.contains(*term)).count() as u32;
    if p.label.is_match(sentence) {
        score += 3;
    }
    if p.statistic.is_match(sentence) {
        score += 2;
    }
    score
}

/// Compress `text` to its highest-scoring sentences within `max_chars`.
///
/// Text that is empty or already fits is returned unchanged. Sentences are
/// ranked by key terms, section labels ("Results:") and statistics, ties keep
/// their original order, and the best ones are joined with `". "` until the
/// next would overflow the budget. Falls back to a hard cut when no sentence
/// is long enough to keep.
pub fn minify_abstract(text: &str, max_chars: usize) -> String {
    if text.is_empty() || text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut scored: Vec<(u32, &str)> = patterns()
        .sentence_end
        .split(text)
        .map(|s| s.trim().trim_end_matches(['.', '!', '?']).trim_end())
        .filter(|s| s.chars().count() >= MIN_SENTENCE_CHARS)
        .map(|s| (score_sentence(s), s))
        .collect();

    // Stable: equal scores keep abstract order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    let mut kept = Vec::new();
    let mut total = 0;
    for (_, sentence) in scored {
        let len = sentence.chars().count();
        if total + len > max_chars {
            break;
        }
        kept.push(sentence);
        total += len + 2;
    }

    if kept.is_empty() {
        return take_chars(text, max_chars);
    }
    format!("{}.", kept.join(". "))
}
