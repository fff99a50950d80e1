//! Paper model representing a literature record supplied by a source.

use serde::{Deserialize, Serialize};

/// A paper author, either a person or a collective (group) name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Family name
    #[serde(default)]
    pub last_name: String,

    /// Given name(s)
    #[serde(default)]
    pub fore_name: String,

    /// Group or consortium name, used instead of the personal name when set
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collective_name: String,
}

impl Author {
    /// Create a personal author
    pub fn new(last_name: impl Into<String>, fore_name: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            fore_name: fore_name.into(),
            collective_name: String::new(),
        }
    }

    /// Create a collective (group) author
    pub fn collective(name: impl Into<String>) -> Self {
        Self {
            collective_name: name.into(),
            ..Default::default()
        }
    }

    /// Returns "ForeName LastName", or the collective name if present
    pub fn full_name(&self) -> String {
        if !self.collective_name.trim().is_empty() {
            return self.collective_name.trim().to_string();
        }
        let last = self.last_name.trim();
        let fore = self.fore_name.trim();
        if fore.is_empty() {
            last.to_string()
        } else if last.is_empty() {
            fore.to_string()
        } else {
            format!("{} {}", fore, last)
        }
    }

    /// Returns "Last, First", the collective name verbatim, or whichever part exists
    pub fn sort_name(&self) -> String {
        if !self.collective_name.trim().is_empty() {
            return self.collective_name.trim().to_string();
        }
        let last = self.last_name.trim();
        let fore = self.fore_name.trim();
        match (last.is_empty(), fore.is_empty()) {
            (false, false) => format!("{}, {}", last, fore),
            (false, true) => last.to_string(),
            (true, false) => fore.to_string(),
            (true, true) => String::new(),
        }
    }
}

/// A biomedical literature record
///
/// Papers are produced by a [`LiteratureSource`](crate::sources::LiteratureSource)
/// and are read-only to the engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paper {
    /// PubMed identifier
    pub pmid: String,

    /// Article title
    pub title: String,

    /// Abstract text
    #[serde(default)]
    pub r#abstract: String,

    /// Ordered author list
    #[serde(default)]
    pub authors: Vec<Author>,

    /// Journal title
    #[serde(default)]
    pub journal: String,

    /// Publication year as supplied (may carry a month, e.g. "2024 Jan")
    #[serde(default)]
    pub year: String,

    /// Journal volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,

    /// Journal issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    /// Page range, e.g. "100-110"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,

    /// Digital Object Identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
}

impl Paper {
    /// Create a new paper with required fields
    pub fn new(pmid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            pmid: pmid.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// The first author, if any
    pub fn first_author(&self) -> Option<&Author> {
        self.authors.first()
    }

    /// The DOI, treating a blank value as absent
    pub fn doi(&self) -> Option<&str> {
        self.doi.as_deref().map(str::trim).filter(|d| !d.is_empty())
    }

    /// Canonical PubMed URL for this record
    pub fn url(&self) -> String {
        pubmed_url(&self.pmid)
    }
}

/// Canonical PubMed URL for a PMID
pub fn pubmed_url(pmid: &str) -> String {
    format!("https://pubmed.ncbi.nlm.nih.gov/{}/", pmid.trim())
}

/// Builder for constructing Paper objects
#[derive(Debug, Clone)]
pub struct PaperBuilder {
    paper: Paper,
}

impl PaperBuilder {
    /// Create a new builder with required fields
    pub fn new(pmid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            paper: Paper::new(pmid, title),
        }
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.paper.r#abstract = abstract_text.into();
        self
    }

    /// Append a personal author
    pub fn author(mut self, last_name: impl Into<String>, fore_name: impl Into<String>) -> Self {
        self.paper.authors.push(Author::new(last_name, fore_name));
        self
    }

    /// Append a collective author
    pub fn collective_author(mut self, name: impl Into<String>) -> Self {
        self.paper.authors.push(Author::collective(name));
        self
    }

    /// Replace the author list
    pub fn authors(mut self, authors: Vec<Author>) -> Self {
        self.paper.authors = authors;
        self
    }

    /// Set journal
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.paper.journal = journal.into();
        self
    }

    /// Set publication year
    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.paper.year = year.into();
        self
    }

    /// Set volume
    pub fn volume(mut self, volume: impl Into<String>) -> Self {
        self.paper.volume = Some(volume.into());
        self
    }

    /// Set issue
    pub fn issue(mut self, issue: impl Into<String>) -> Self {
        self.paper.issue = Some(issue.into());
        self
    }

    /// Set page range
    pub fn pages(mut self, pages: impl Into<String>) -> Self {
        self.paper.pages = Some(pages.into());
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.paper.doi = Some(doi.into());
        self
    }

    /// Build the Paper
    pub fn build(self) -> Paper {
        self.paper
    }
}
