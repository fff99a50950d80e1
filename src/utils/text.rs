//! Character-safe text helpers.

/// Truncate `text` to at most `max_chars` characters.
///
/// Text that already fits is returned unchanged, without a suffix, so callers
/// can compare lengths to tell whether truncation happened. Otherwise the first
/// `max_chars` characters are kept and `"..."` is appended.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
    }
}

/// Keep the first `max_chars` characters without adding a suffix
pub fn take_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Replace CR, LF and tab characters with single spaces, then trim
pub fn flatten_whitespace(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r', '\t'], " ")
        .trim()
        .to_string()
}
