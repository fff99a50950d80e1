//! Search request and response models.

use serde::{Deserialize, Serialize};

/// Sort field for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    /// The source's own relevance ranking
    Relevance,
    /// Most recent publications first
    Date,
}

/// Search query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Main search query string
    pub query: String,

    /// Maximum number of identifiers to return
    pub limit: usize,

    /// Earliest publication year to include
    pub min_year: Option<u16>,

    /// Latest publication year to include
    pub max_year: Option<u16>,

    /// Sort order requested from the source
    pub sort: Option<SortBy>,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            limit: 20,
            min_year: None,
            max_year: None,
            sort: None,
        }
    }
}

impl SearchQuery {
    /// Create a new search query
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Set maximum results
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Restrict to a publication year range (either bound optional)
    pub fn years(mut self, min_year: Option<u16>, max_year: Option<u16>) -> Self {
        self.min_year = min_year;
        self.max_year = max_year;
        self
    }

    /// Set sort order
    pub fn sort(mut self, sort: SortBy) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// Identifiers returned by a search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Matching identifiers in the source's ranking order
    pub ids: Vec<String>,

    /// Total number of matches known to the source (may exceed `ids.len()`)
    pub total_count: usize,
}

impl SearchResponse {
    /// Create a response whose total equals the returned identifiers
    pub fn new(ids: Vec<String>) -> Self {
        let total_count = ids.len();
        Self { ids, total_count }
    }

    /// Set the total match count
    pub fn with_total(mut self, total_count: usize) -> Self {
        self.total_count = total_count;
        self
    }

    /// Whether the search found nothing
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
