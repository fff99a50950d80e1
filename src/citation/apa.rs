//! Author-year formatting: APA citations, in-text keys and display authors.

use crate::models::{Author, Paper};

/// Display author placeholder for papers without authors
pub(crate) const UNKNOWN_AUTHOR: &str = "Unknown";

/// Year as displayed in citations, `n.d.` when unknown
pub(crate) fn display_year(year: &str) -> &str {
    let year = year.trim();
    if year.is_empty() {
        "n.d."
    } else {
        year
    }
}

fn last_token(s: &str) -> Option<&str> {
    s.split_whitespace().last()
}

/// Name used for the first author in keys: collective name, last name, or
/// the last token of the full name.
fn first_author_key_name(paper: &Paper) -> Option<String> {
    let author = paper.first_author()?;
    let collective = author.collective_name.trim();
    if !collective.is_empty() {
        return Some(collective.to_string());
    }
    let last = author.last_name.trim();
    if !last.is_empty() {
        return Some(last.to_string());
    }
    last_token(&author.full_name()).map(str::to_string)
}

/// In-text citation key such as `"Smith, 2024"` or `"Smith et al., 2024"`
pub fn in_text_key(paper: &Paper) -> String {
    let name = first_author_key_name(paper).unwrap_or_else(|| "Unknown".to_string());
    let year = display_year(&paper.year);
    if paper.authors.len() <= 1 {
        format!("{}, {}", name, year)
    } else {
        format!("{} et al., {}", name, year)
    }
}

/// Author string shown in references: `"A"`, `"A & B"` or `"A et al."`
pub fn display_authors(authors: &[Author]) -> String {
    match authors {
        [] => UNKNOWN_AUTHOR.to_string(),
        [only] => only.full_name(),
        [first, second] => format!("{} & {}", first.full_name(), second.full_name()),
        [first, ..] => format!("{} et al.", first.full_name()),
    }
}

/// Every author in "Last, First" form, collective names verbatim
pub fn authors_list(authors: &[Author]) -> Vec<String> {
    authors
        .iter()
        .map(Author::sort_name)
        .filter(|name| !name.is_empty())
        .collect()
}

fn initials(fore_name: &str) -> String {
    fore_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .map(String::from)
        .collect::<Vec<_>>()
        .join(". ")
}

fn apa_author(author: &Author) -> String {
    let collective = author.collective_name.trim();
    let last = author.last_name.trim();
    let fore = author.fore_name.trim();

    let name = if !collective.is_empty() {
        collective.to_string()
    } else if !last.is_empty() && !fore.is_empty() {
        format!("{}, {}", last, initials(fore))
    } else if !last.is_empty() {
        last.to_string()
    } else if !fore.is_empty() {
        fore.to_string()
    } else {
        return "Unknown".to_string();
    };

    if name.ends_with('.') {
        name
    } else {
        format!("{}.", name)
    }
}

fn apa_authors(authors: &[Author]) -> String {
    match authors.len() {
        0 => "Unknown".to_string(),
        1 => apa_author(&authors[0]),
        2..=7 => {
            let (rest, last) = authors.split_at(authors.len() - 1);
            let mut parts: Vec<String> = rest.iter().map(apa_author).collect();
            parts.push(format!("& {}", apa_author(&last[0])));
            parts.join(", ")
        }
        n => {
            let mut parts: Vec<String> = authors[..6].iter().map(apa_author).collect();
            parts.push("...".to_string());
            parts.push(format!("& {}", apa_author(&authors[n - 1])));
            parts.join(", ")
        }
    }
}

/// Format a paper as an APA-style reference
///
/// `Authors (Year). Title. Journal.` followed by the DOI link when present.
pub fn format_apa(paper: &Paper) -> String {
    let title = paper.title.trim();
    let title_end = if title.ends_with(['.', '?', '!']) { "" } else { "." };

    let mut citation = format!(
        "{} ({}). {}{} {}.",
        apa_authors(&paper.authors),
        display_year(&paper.year),
        title,
        title_end,
        paper.journal.trim()
    );
    if let Some(doi) = paper.doi() {
        citation.push_str(&format!(" https://doi.org/{}", doi));
    }
    citation
}
