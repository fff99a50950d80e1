//! BibTeX export with collision-safe citation keys.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use super::apa::UNKNOWN_AUTHOR;
use crate::models::Reference;
use crate::utils::flatten_whitespace;

const MAX_KEY_LEN: usize = 64;

fn year_regex() -> &'static Regex {
    static YEAR_RE: OnceLock<Regex> = OnceLock::new();
    YEAR_RE.get_or_init(|| Regex::new(r"[0-9]{4}").expect("valid year regex"))
}

/// Bijective base-26 suffix: 0 → `""`, 1 → `a`, 26 → `z`, 27 → `aa`
pub fn alpha_suffix(mut n: usize) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Drop a trailing "et al." and anything after it
fn strip_et_al(name: &str) -> &str {
    match name.find("et al") {
        Some(idx) => name[..idx].trim(),
        None => name.trim(),
    }
}

/// Surname token used in keys: the part before a comma, else the last word
fn key_author_token(name: &str) -> String {
    let name = strip_et_al(name);
    let token = match name.split_once(',') {
        Some((last, _)) => last.trim(),
        None => name.split_whitespace().last().unwrap_or(""),
    };
    if token.is_empty() {
        "Unknown".to_string()
    } else {
        token.to_string()
    }
}

/// First run of four ASCII digits in the year field, `nd` when there is none
fn key_year(year: &str) -> &str {
    year_regex().find(year).map(|m| m.as_str()).unwrap_or("nd")
}

/// Keep ASCII alphanumerics, prefix a leading digit with `Ref`, cap the length
fn sanitize_key(raw: &str) -> String {
    let mut key: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
    if key.starts_with(|c: char| c.is_ascii_digit()) {
        key.insert_str(0, "Ref");
    }
    key.truncate(MAX_KEY_LEN);
    key
}

fn key_base(reference: &Reference) -> String {
    let author = reference
        .authors_list
        .first()
        .map(String::as_str)
        .unwrap_or(&reference.authors);
    sanitize_key(&format!(
        "{}{}",
        key_author_token(author),
        key_year(&reference.year)
    ))
}

/// Generate one citation key per reference, unique within the slice.
///
/// Keys are `{Surname}{Year}`; repeats get `a`, `b`, ... `z`, `aa`, ...
/// suffixes in order of appearance.
pub fn generate_citation_keys(references: &[Reference]) -> Vec<String> {
    let mut used = HashSet::new();
    references
        .iter()
        .map(|reference| {
            let base = key_base(reference);
            let key = (0..)
                .map(|n| format!("{}{}", base, alpha_suffix(n)))
                .find(|candidate| !used.contains(candidate))
                .unwrap_or_default();
            used.insert(key.clone());
            key
        })
        .collect()
}

/// Escape LaTeX special characters and flatten whitespace
pub fn latex_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in flatten_whitespace(value).chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            '~' => out.push_str("\\~{}"),
            '^' => out.push_str("\\^{}"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert "First Middle Last" to "Last, First Middle"
///
/// Names that already contain a comma, and single-word names, are kept.
pub fn bibtex_author_from_name(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        return "Unknown".to_string();
    }
    if name.contains(',') {
        return name.to_string();
    }
    let words: Vec<&str> = name.split_whitespace().collect();
    match words.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, {}", last, rest.join(" ")),
        _ => name.to_string(),
    }
}

/// Split a display author string (`"A & B"`, `"A et al."`) into BibTeX names
pub fn parse_author_string(authors: &str) -> Vec<String> {
    let authors = strip_et_al(authors);
    authors
        .split('&')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(bibtex_author_from_name)
        .collect()
}

fn entry_authors(reference: &Reference) -> Vec<String> {
    if !reference.authors_list.is_empty() {
        reference.authors_list.clone()
    } else if reference.authors.trim() == UNKNOWN_AUTHOR {
        Vec::new()
    } else {
        parse_author_string(&reference.authors)
    }
}

/// Render one `@article` entry under `key`
pub fn bibtex_entry(key: &str, reference: &Reference) -> String {
    let authors = entry_authors(reference)
        .iter()
        .map(|a| latex_escape(a))
        .collect::<Vec<_>>()
        .join(" and ");

    let fields = [
        ("author", authors),
        ("title", latex_escape(&reference.title)),
        ("journal", latex_escape(&reference.journal)),
        ("year", latex_escape(&reference.year)),
        ("volume", latex_escape(reference.volume.as_deref().unwrap_or(""))),
        ("number", latex_escape(reference.issue.as_deref().unwrap_or(""))),
        ("pages", latex_escape(reference.pages.as_deref().unwrap_or(""))),
        ("doi", latex_escape(reference.doi.as_deref().unwrap_or(""))),
        ("pmid", latex_escape(&reference.pmid)),
    ];

    let body = fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(name, value)| format!("  {} = {{{}}}", name, value))
        .collect::<Vec<_>>()
        .join(",\n");

    if body.is_empty() {
        format!("@article{{{},\n}}", key)
    } else {
        format!("@article{{{},\n{}\n}}", key, body)
    }
}

/// Render references as a BibTeX blob, entries separated by a blank line.
///
/// Returns an empty string for no references.
pub fn generate_bibtex(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let keys = generate_citation_keys(references);
    let entries: Vec<String> = keys
        .iter()
        .zip(references)
        .map(|(key, reference)| bibtex_entry(key, reference))
        .collect();
    format!("{}\n", entries.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(authors: &str, year: &str) -> Reference {
        Reference {
            authors: authors.to_string(),
            year: year.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_alpha_suffix() {
        assert_eq!(alpha_suffix(0), "");
        assert_eq!(alpha_suffix(1), "a");
        assert_eq!(alpha_suffix(26), "z");
        assert_eq!(alpha_suffix(27), "aa");
        assert_eq!(alpha_suffix(28), "ab");
        assert_eq!(alpha_suffix(52), "az");
        assert_eq!(alpha_suffix(53), "ba");
        assert_eq!(alpha_suffix(702), "zz");
        assert_eq!(alpha_suffix(703), "aaa");
    }

    #[test]
    fn test_key_parts() {
        assert_eq!(key_author_token("Smith, John"), "Smith");
        assert_eq!(key_author_token("John Smith"), "Smith");
        assert_eq!(key_author_token("Smith et al."), "Smith");
        assert_eq!(key_author_token("   "), "Unknown");

        assert_eq!(key_year("2024 Jan"), "2024");
        assert_eq!(key_year("Jan 2022"), "2022");
        assert_eq!(key_year("202"), "nd");
        assert_eq!(key_year(""), "nd");
        assert_eq!(key_year("２０２４"), "nd");
        assert_eq!(key_year("٢٠٢٤ / 2023"), "2023");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Smith-Jones_2024"), "SmithJones2024");
        assert_eq!(sanitize_key("2024Smith"), "Ref2024Smith");
        assert_eq!(sanitize_key("Müller2024"), "Mller2024");
        assert_eq!(sanitize_key(&"a".repeat(100)), "a".repeat(64));
    }

    #[test]
    fn test_colliding_keys_get_suffixes() {
        let refs = vec![
            reference("Smith, John", "2024"),
            reference("Smith, Jane", "2024"),
            reference("Smith, Bob", "2024"),
            reference("Jones", ""),
        ];
        assert_eq!(
            generate_citation_keys(&refs),
            vec!["Smith2024", "Smith2024a", "Smith2024b", "Jonesnd"]
        );
    }

    #[test]
    fn test_many_collisions_stay_distinct() {
        let refs: Vec<Reference> = (0..60).map(|_| reference("Lee", "2021")).collect();
        let keys = generate_citation_keys(&refs);
        let unique: HashSet<&String> = keys.iter().collect();
        assert_eq!(unique.len(), 60);
        assert_eq!(keys[27], "Lee2021aa");
        assert!(keys.iter().all(|k| !k.is_empty()));
    }

    #[test]
    fn test_authors_list_takes_precedence() {
        let mut r = reference("Wrong Author", "2024");
        r.authors_list = vec!["Right, Person".to_string()];
        assert_eq!(generate_citation_keys(&[r]), vec!["Right2024"]);
        assert_eq!(generate_citation_keys(&[reference("", "2024")]), vec!["Unknown2024"]);
    }

    #[test]
    fn test_non_ascii_years_and_names_still_yield_keys() {
        let mut chinese = reference("", "２０２４");
        chinese.authors_list = vec!["王".to_string()];
        let arabic_year = reference("Smith", "٢٠٢٤");
        let both = reference("王", "2024");

        let keys = generate_citation_keys(&[chinese, arabic_year, both]);
        assert_eq!(keys, vec!["nd", "Smithnd", "Ref2024"]);
        assert!(keys.iter().all(|k| !k.is_empty()));
    }

    #[test]
    fn test_placeholder_author_is_not_emitted() {
        let r = Reference {
            pmid: "1".into(),
            title: "Anonymous report".into(),
            authors: "Unknown".into(),
            year: "2020".into(),
            ..Default::default()
        };
        let out = generate_bibtex(&[r]);
        assert!(out.starts_with("@article{Unknown2020,\n  title = {Anonymous report},"));
        assert!(!out.contains("author ="));
    }

    #[test]
    fn test_latex_escape() {
        assert_eq!(latex_escape("Smith & Jones"), "Smith \\& Jones");
        assert_eq!(latex_escape("A & B: 100% ($)"), "A \\& B: 100\\% (\\$)");
        assert_eq!(latex_escape("var_name #1"), "var\\_name \\#1");
        assert_eq!(latex_escape("{text}"), "\\{text\\}");
        assert_eq!(latex_escape("path\\to"), "path\\\\to");
        assert_eq!(latex_escape("~user x^2"), "\\~{}user x\\^{}2");
        assert_eq!(latex_escape("a\r\nb\tc"), "a b c");
        assert_eq!(latex_escape("  hello  "), "hello");
    }

    #[test]
    fn test_author_parsing() {
        assert_eq!(bibtex_author_from_name("John Paul Smith"), "Smith, John Paul");
        assert_eq!(bibtex_author_from_name("Smith, John"), "Smith, John");
        assert_eq!(bibtex_author_from_name("Madonna"), "Madonna");
        assert_eq!(bibtex_author_from_name(" "), "Unknown");

        assert_eq!(
            parse_author_string("John Smith & Jane Jones"),
            vec!["Smith, John", "Jones, Jane"]
        );
        assert_eq!(parse_author_string("John Smith et al."), vec!["Smith, John"]);
        assert_eq!(parse_author_string("WHO"), vec!["WHO"]);
        assert!(parse_author_string("   ").is_empty());
    }

    #[test]
    fn test_generate_bibtex() {
        assert_eq!(generate_bibtex(&[]), "");

        let r = Reference {
            pmid: "12345678".into(),
            title: "Test & Title".into(),
            authors: "John Smith & Jane Jones".into(),
            authors_list: vec!["Smith, John".into(), "Jones, Jane".into()],
            journal: "Nature".into(),
            year: "2024".into(),
            doi: Some("10.1234/test".into()),
            pages: Some("12-19".into()),
            ..Default::default()
        };
        let out = generate_bibtex(&[r.clone(), r]);

        assert!(out.starts_with("@article{Smith2024,\n"));
        assert!(out.contains("  author = {Smith, John and Jones, Jane},\n"));
        assert!(out.contains("  title = {Test \\& Title},\n"));
        assert!(out.contains("  pages = {12-19},\n"));
        assert!(out.contains("  pmid = {12345678}\n}"));
        assert!(!out.contains("volume"));
        assert!(out.contains("}\n\n@article{Smith2024a,\n"));
        assert!(out.ends_with("}\n"));
    }
}
