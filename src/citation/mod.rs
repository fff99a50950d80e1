//! Citation rendering: APA strings, in-text keys, RIS and BibTeX.
//!
//! [`build_references`] turns the papers a synthesis kept into [`Reference`]
//! records with collision-free keys; [`generate_ris`] and [`generate_bibtex`]
//! render those records for reference managers.
//!
//! ```rust
//! use pubmed_synth::citation::{build_references, generate_ris};
//! use pubmed_synth::models::{PaperBuilder, ScoredPaper};
//!
//! let paper = PaperBuilder::new("123", "A trial").author("Smith", "John").year("2024").build();
//! let refs = build_references(&[ScoredPaper { paper, relevance_score: 9 }]);
//! assert_eq!(refs[0].key, "Smith2024");
//! assert!(generate_ris(&refs).contains("AU  - Smith, John"));
//! ```

mod apa;
mod bibtex;
mod export;
mod ris;

pub use apa::{authors_list, display_authors, format_apa, in_text_key};
pub use bibtex::{
    alpha_suffix, bibtex_author_from_name, bibtex_entry, generate_bibtex, generate_citation_keys,
    latex_escape, parse_author_string,
};
pub use export::{write_bibtex_file, write_ris_file};
pub use ris::{generate_ris, ris_entry, split_pages};

use crate::models::{Paper, Reference, ScoredPaper};

/// Build the reference record for one paper, without a key
pub fn build_reference(paper: &Paper, relevance_score: u8) -> Reference {
    Reference {
        key: String::new(),
        pmid: paper.pmid.clone(),
        citation_apa: format_apa(paper),
        relevance_score,
        doi: paper.doi().map(str::to_string),
        title: paper.title.clone(),
        r#abstract: paper.r#abstract.clone(),
        year: paper.year.clone(),
        authors: display_authors(&paper.authors),
        authors_list: authors_list(&paper.authors),
        journal: paper.journal.clone(),
        volume: paper.volume.clone(),
        issue: paper.issue.clone(),
        pages: paper.pages.clone(),
    }
}

/// Build references in order and assign each a key unique within the batch
pub fn build_references(papers: &[ScoredPaper]) -> Vec<Reference> {
    let mut references: Vec<Reference> = papers
        .iter()
        .map(|sp| build_reference(&sp.paper, sp.relevance_score))
        .collect();
    let keys = generate_citation_keys(&references);
    for (reference, key) in references.iter_mut().zip(keys) {
        reference.key = key;
    }
    references
}
