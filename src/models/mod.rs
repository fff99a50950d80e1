//! Core data models for papers, search requests and engine results.

mod paper;
mod result;
mod search;

pub use paper::{pubmed_url, Author, Paper, PaperBuilder};
pub use result::{
    Answer, ProgressPhase, ProgressUpdate, QaResult, Reference, ScoredPaper, Strategy,
    SynthesisResult, TokenCount, TokenUsage,
};
pub use search::{SearchQuery, SearchResponse, SortBy};
