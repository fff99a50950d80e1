//! RIS export for reference managers.

use super::apa::UNKNOWN_AUTHOR;
use crate::models::{pubmed_url, Reference};
use crate::utils::{flatten_whitespace, truncate};

const MAX_ABSTRACT_CHARS: usize = 5000;

/// Split a page range at the first `-`, `–` or `—`.
///
/// Returns `(start, end)`; `end` is empty for single pages.
pub fn split_pages(pages: &str) -> (String, String) {
    let pages = pages.trim();
    match pages.find(['-', '–', '—']) {
        Some(idx) => {
            let sep_len = pages[idx..].chars().next().map_or(1, char::len_utf8);
            (
                pages[..idx].trim().to_string(),
                pages[idx + sep_len..].trim().to_string(),
            )
        }
        None => (pages.to_string(), String::new()),
    }
}

/// RIS author names: the structured list, else the display string split on `&`
fn ris_authors(reference: &Reference) -> Vec<String> {
    if !reference.authors_list.is_empty() {
        return reference.authors_list.clone();
    }
    if reference.authors.trim() == UNKNOWN_AUTHOR {
        return Vec::new();
    }
    let display = match reference.authors.find("et al") {
        Some(idx) => &reference.authors[..idx],
        None => reference.authors.as_str(),
    };
    display
        .split('&')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

struct RisWriter {
    lines: Vec<String>,
}

impl RisWriter {
    fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add a tag line; values that are blank after flattening are skipped
    fn tag(&mut self, tag: &str, value: &str) {
        let value = flatten_whitespace(value);
        if !value.is_empty() {
            self.lines.push(format!("{}  - {}", tag, value));
        }
    }

    fn finish(mut self) -> String {
        self.lines.push("ER  -".to_string());
        self.lines.join("\n")
    }
}

/// Render one RIS stanza, ending in `ER  -`
pub fn ris_entry(reference: &Reference) -> String {
    let mut w = RisWriter::new();
    w.tag("TY", "JOUR");
    w.tag("TI", &reference.title);
    for author in ris_authors(reference) {
        w.tag("AU", &author);
    }
    w.tag("PY", &reference.year);
    w.tag("JO", &reference.journal);
    w.tag("VL", reference.volume.as_deref().unwrap_or(""));
    w.tag("IS", reference.issue.as_deref().unwrap_or(""));

    let (start, end) = split_pages(reference.pages.as_deref().unwrap_or(""));
    w.tag("SP", &start);
    w.tag("EP", &end);

    w.tag("DO", reference.doi.as_deref().unwrap_or(""));
    w.tag(
        "AB",
        &truncate(&flatten_whitespace(&reference.r#abstract), MAX_ABSTRACT_CHARS),
    );

    let pmid = reference.pmid.trim();
    if !pmid.is_empty() {
        w.tag("ID", &format!("PMID:{}", pmid));
        w.tag("UR", &pubmed_url(pmid));
    }
    w.finish()
}

/// Render references as an RIS blob, stanzas separated by a blank line.
///
/// Returns an empty string for no references.
pub fn generate_ris(references: &[Reference]) -> String {
    if references.is_empty() {
        return String::new();
    }
    let stanzas: Vec<String> = references.iter().map(ris_entry).collect();
    format!("{}\n", stanzas.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_reference() -> Reference {
        Reference {
            key: "Smith2024".into(),
            pmid: "12345678".into(),
            title: "Test Article Title".into(),
            r#abstract: "This is a\ntest abstract.".into(),
            year: "2024".into(),
            authors: "John Smith & Jane Jones".into(),
            authors_list: vec!["Smith, John".into(), "Jones, Jane".into()],
            journal: "Nature".into(),
            volume: Some("12".into()),
            issue: Some("3".into()),
            pages: Some("100–110".into()),
            doi: Some("10.1234/test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_full_entry_tag_order() {
        let entry = ris_entry(&full_reference());
        let expected = "TY  - JOUR\n\
                        TI  - Test Article Title\n\
                        AU  - Smith, John\n\
                        AU  - Jones, Jane\n\
                        PY  - 2024\n\
                        JO  - Nature\n\
                        VL  - 12\n\
                        IS  - 3\n\
                        SP  - 100\n\
                        EP  - 110\n\
                        DO  - 10.1234/test\n\
                        AB  - This is a test abstract.\n\
                        ID  - PMID:12345678\n\
                        UR  - https://pubmed.ncbi.nlm.nih.gov/12345678/\n\
                        ER  -";
        assert_eq!(entry, expected);
    }

    #[test]
    fn test_missing_fields_are_omitted() {
        let r = Reference {
            title: "Minimal Reference".into(),
            authors: "Doe, Jane".into(),
            ..Default::default()
        };
        assert_eq!(
            ris_entry(&r),
            "TY  - JOUR\nTI  - Minimal Reference\nAU  - Doe, Jane\nER  -"
        );
    }

    #[test]
    fn test_display_author_fallback() {
        let r = Reference {
            title: "T".into(),
            authors: "Smith, John & Jones, Jane et al.".into(),
            ..Default::default()
        };
        let entry = ris_entry(&r);
        assert!(entry.contains("AU  - Smith, John\nAU  - Jones, Jane\n"));
    }

    #[test]
    fn test_authorless_paper_has_no_au_line() {
        let paper = crate::models::PaperBuilder::new("77", "Editorial").year("2021").build();
        let reference = crate::citation::build_reference(&paper, 8);
        assert_eq!(reference.authors, "Unknown");

        let entry = ris_entry(&reference);
        assert!(!entry.contains("AU  -"));
        assert!(entry.starts_with("TY  - JOUR\nTI  - Editorial\nPY  - 2021\n"));
    }

    #[test]
    fn test_split_pages() {
        assert_eq!(split_pages("123-130"), ("123".into(), "130".into()));
        assert_eq!(split_pages(" e45 "), ("e45".into(), String::new()));
        assert_eq!(split_pages("5—9"), ("5".into(), "9".into()));
        assert_eq!(split_pages("1–2-3"), ("1".into(), "2-3".into()));
        assert_eq!(split_pages(""), (String::new(), String::new()));
    }

    #[test]
    fn test_long_abstract_truncated() {
        let r = Reference {
            title: "T".into(),
            r#abstract: "a".repeat(6000),
            ..Default::default()
        };
        let entry = ris_entry(&r);
        let ab = entry
            .lines()
            .find_map(|l| l.strip_prefix("AB  - "))
            .unwrap();
        assert_eq!(ab.chars().count(), 5003);
        assert!(ab.ends_with("..."));
    }

    #[test]
    fn test_generate_ris_stanzas() {
        assert_eq!(generate_ris(&[]), "");

        let refs = vec![full_reference(), full_reference()];
        let out = generate_ris(&refs);
        assert_eq!(out.matches("TY  - JOUR").count(), 2);
        assert_eq!(out.matches("ER  -").count(), 2);
        assert!(out.contains("ER  -\n\nTY  - JOUR"));
        assert!(out.ends_with("ER  -\n"));
    }
}
