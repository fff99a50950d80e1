//! Error types for the answer and synthesis pipelines.

use crate::sources::ServiceError;
use std::fmt;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage an upstream failure happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Search,
    Fetch,
    Score,
    Confidence,
    Answer,
    Synthesis,
}

impl Stage {
    /// Returns the stage name used in error messages and logs
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Search => "search",
            Stage::Fetch => "fetch",
            Stage::Score => "relevance scoring",
            Stage::Confidence => "confidence check",
            Stage::Answer => "answer",
            Stage::Synthesis => "synthesis",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad question, PMID or configuration. Never worth retrying.
    InvalidInput,
    /// A literature or completion call (or an export write) failed.
    Upstream,
    /// The run completed its calls but produced nothing usable.
    BusinessOutcome,
    /// The caller cancelled the operation.
    Cancelled,
}

/// Errors returned by the answer and synthesis engines
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty question or PMID, or otherwise unusable input
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Configuration failed validation
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Literature source failure (search or fetch)
    #[error("{stage}: {source}")]
    Retrieval { stage: Stage, source: ServiceError },

    /// Completion service failure
    #[error("{stage}: {source}")]
    Completion { stage: Stage, source: ServiceError },

    /// Every paper in the scoring batch failed
    #[error("relevance scoring failed for all {count} papers: {source}")]
    AllScoringFailed { count: usize, source: ServiceError },

    /// Search returned no hits
    #[error("no papers found for query: {0}")]
    NoResults(String),

    /// Fetch returned no records for the hits
    #[error("fetch: no papers returned for query: {0}")]
    FetchEmpty(String),

    /// A single requested record does not exist
    #[error("paper not found: {0}")]
    PaperNotFound(String),

    /// No scored paper reached the relevance threshold
    #[error("no papers met relevance threshold ({threshold}) for: {question}")]
    ThresholdNotMet { threshold: u8, question: String },

    /// The completion service returned a blank synthesis
    #[error("synthesis: empty response")]
    EmptySynthesis,

    /// The operation was cancelled by the caller
    #[error("operation cancelled")]
    Cancelled,

    /// Writing an export file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a literature source failure, keeping cancellation distinct
    pub fn retrieval(stage: Stage, source: ServiceError) -> Self {
        if source.is_cancelled() {
            Error::Cancelled
        } else {
            Error::Retrieval { stage, source }
        }
    }

    /// Wrap a completion service failure, keeping cancellation distinct
    pub fn completion(stage: Stage, source: ServiceError) -> Self {
        if source.is_cancelled() {
            Error::Cancelled
        } else {
            Error::Completion { stage, source }
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidInput(_) | Error::InvalidConfig(_) => ErrorKind::InvalidInput,
            Error::Retrieval { .. }
            | Error::Completion { .. }
            | Error::AllScoringFailed { .. }
            | Error::Io(_) => ErrorKind::Upstream,
            Error::NoResults(_)
            | Error::FetchEmpty(_)
            | Error::PaperNotFound(_)
            | Error::ThresholdNotMet { .. }
            | Error::EmptySynthesis => ErrorKind::BusinessOutcome,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// The stage an upstream failure happened in, if any
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Retrieval { stage, .. } | Error::Completion { stage, .. } => Some(*stage),
            Error::AllScoringFailed { .. } => Some(Stage::Score),
            _ => None,
        }
    }

    /// Whether this error is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
