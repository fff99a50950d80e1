//! Output models produced by the answer and synthesis engines.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::AddAssign;

use super::Paper;

/// A paper together with its 1-10 relevance score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredPaper {
    pub paper: Paper,
    pub relevance_score: u8,
}

/// Output-facing citation record for a paper used in a synthesis
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Collision-free citation key, unique within one result
    pub key: String,
    pub pmid: String,
    pub citation_apa: String,
    pub relevance_score: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub r#abstract: String,
    pub year: String,
    /// Display form: "A", "A & B" or "A et al."
    pub authors: String,
    /// Every author as "Last, First" (collective names verbatim)
    #[serde(skip)]
    pub authors_list: Vec<String>,
    pub journal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<String>,
}

/// Token estimates for one completion call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenCount {
    pub input: usize,
    pub output: usize,
}

/// Accumulated token estimates for a whole run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input: usize,
    pub output: usize,
    pub total: usize,
}

impl TokenUsage {
    /// Set `total` to `input + output`
    pub fn finalize(&mut self) {
        self.total = self.input + self.output;
    }
}

impl AddAssign<TokenCount> for TokenUsage {
    fn add_assign(&mut self, rhs: TokenCount) {
        self.input += rhs.input;
        self.output += rhs.output;
    }
}

/// Result of a literature synthesis run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    pub question: String,
    pub synthesis: String,
    pub papers_searched: usize,
    pub papers_scored: usize,
    pub papers_used: usize,
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ris: String,
    pub tokens: TokenUsage,
}

impl SynthesisResult {
    /// Render the references as a BibTeX blob
    pub fn bibtex(&self) -> String {
        crate::citation::generate_bibtex(&self.references)
    }
}

/// How an answer was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// From the model's trained knowledge alone
    Parametric,
    /// Grounded in retrieved literature
    Retrieval,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Parametric => write!(f, "parametric"),
            Strategy::Retrieval => write!(f, "retrieval"),
        }
    }
}

/// A yes/no answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// "yes" anywhere in the reply (case-insensitive) means yes
    pub fn from_reply(reply: &str) -> Self {
        if reply.to_lowercase().contains("yes") {
            Answer::Yes
        } else {
            Answer::No
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Yes => write!(f, "yes"),
            Answer::No => write!(f, "no"),
        }
    }
}

fn is_zero(value: &u8) -> bool {
    *value == 0
}

/// Result of adaptive question answering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaResult {
    pub question: String,
    pub answer: Answer,
    /// Self-reported confidence, 0 when no confidence check ran
    #[serde(default, skip_serializing_if = "is_zero")]
    pub confidence: u8,
    pub strategy: Strategy,
    pub novel_detected: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_pmids: Vec<String>,
    /// Minified evidence shown to the model
    #[serde(default, rename = "context", skip_serializing_if = "Option::is_none")]
    pub minified_context: Option<String>,
}

/// Where the synthesis pipeline currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProgressPhase {
    Search,
    Fetch,
    Score,
    Filter,
    Synthesis,
    CitationExport,
}

/// Progress event emitted while a synthesis runs
///
/// `current`/`total` are only meaningful for per-paper scoring updates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub phase: ProgressPhase,
    pub message: String,
    pub current: usize,
    pub total: usize,
}

impl ProgressUpdate {
    /// A phase-level update without counters
    pub fn new(phase: ProgressPhase, message: impl Into<String>) -> Self {
        Self {
            phase,
            message: message.into(),
            current: 0,
            total: 0,
        }
    }

    /// Attach `current/total` counters
    pub fn with_counts(mut self, current: usize, total: usize) -> Self {
        self.current = current;
        self.total = total;
        self
    }
}
