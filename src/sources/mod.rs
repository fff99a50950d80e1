//! Literature source abstraction.
//!
//! This module defines the [`LiteratureSource`] trait the engines use to search
//! for and fetch biomedical records. Concrete backends (PubMed E-utilities,
//! Europe PMC, a local cache, ...) live outside this crate and implement the
//! trait; the engines only ever see the two methods below.
//!
//! # Implementing a Source
//!
//! 1. Create a struct that implements `LiteratureSource`
//! 2. Honour the [`CancellationToken`]: return [`ServiceError::Cancelled`] as soon
//!    as it fires
//! 3. Put rate limiting and retries inside the implementation, or wrap it in
//!    [`RetryingSource`](crate::utils::RetryingSource)
//!
//! # Testing
//!
//! [`MockLiteratureSource`] serves a fixed set of papers and records every call.

pub mod mock;

pub use mock::MockLiteratureSource;

use crate::models::{Paper, SearchQuery, SearchResponse};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A searchable, fetchable collection of literature records
#[async_trait]
pub trait LiteratureSource: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str {
        "literature source"
    }

    /// Search for record identifiers matching the query
    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, ServiceError>;

    /// Fetch full records for the given identifiers
    ///
    /// Missing identifiers are skipped; the returned list may be shorter than `ids`.
    async fn fetch(
        &self,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Paper>, ServiceError>;
}

/// Errors that can occur when calling a literature source or completion service
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,

    /// The request exceeded the collaborator's own deadline
    #[error("Request timed out")]
    Timeout,

    /// Network or transport error
    #[error("Network error: {0}")]
    Network(String),

    /// API error reported by the remote service
    #[error("API error: {0}")]
    Api(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request parameters
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl ServiceError {
    /// Whether this error signals caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }
}
