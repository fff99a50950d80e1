//! Mock literature source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::models::{Paper, PaperBuilder, SearchQuery, SearchResponse};
use crate::sources::{LiteratureSource, ServiceError};

/// A mock source that serves a fixed set of papers.
///
/// `search` returns the ids of the configured papers (up to the query limit),
/// `fetch` returns the configured papers whose ids were requested, in request
/// order. Failures can be injected for either call.
#[derive(Debug, Default)]
pub struct MockLiteratureSource {
    papers: Vec<Paper>,
    search_ids: Option<Vec<String>>,
    search_error: Option<ServiceError>,
    fetch_error: Option<ServiceError>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockLiteratureSource {
    /// Create an empty mock source (every search finds nothing).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock source serving these papers.
    pub fn with_papers(papers: Vec<Paper>) -> Self {
        Self {
            papers,
            ..Default::default()
        }
    }

    /// Override the identifiers returned by `search`.
    pub fn search_ids(mut self, ids: Vec<String>) -> Self {
        self.search_ids = Some(ids);
        self
    }

    /// Make every `search` call fail with this error.
    pub fn fail_search(mut self, error: ServiceError) -> Self {
        self.search_error = Some(error);
        self
    }

    /// Make every `fetch` call fail with this error.
    pub fn fail_fetch(mut self, error: ServiceError) -> Self {
        self.fetch_error = Some(error);
        self
    }

    /// Number of `search` calls made so far.
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch` calls made so far.
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LiteratureSource for MockLiteratureSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, ServiceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        if let Some(err) = &self.search_error {
            return Err(err.clone());
        }

        let all: Vec<String> = match &self.search_ids {
            Some(ids) => ids.clone(),
            None => self.papers.iter().map(|p| p.pmid.clone()).collect(),
        };
        let total = all.len();
        let ids = all.into_iter().take(query.limit).collect();
        Ok(SearchResponse::new(ids).with_total(total))
    }

    async fn fetch(
        &self,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Paper>, ServiceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        if let Some(err) = &self.fetch_error {
            return Err(err.clone());
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.papers.iter().find(|p| &p.pmid == id).cloned())
            .collect())
    }
}

/// Helper function to create a mock paper for testing.
pub fn make_paper(pmid: &str, title: &str) -> Paper {
    PaperBuilder::new(pmid, title)
        .author("Author", "Test")
        .abstract_text(format!("Abstract of {}.", title))
        .journal("Test Journal")
        .year("2024")
        .build()
}
