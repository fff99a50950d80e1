//! Engine and logging settings.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Options for [`SynthesisEngine`](crate::synth::SynthesisEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthConfig {
    /// How many papers the synthesis cites
    #[serde(default = "default_papers_to_use")]
    pub papers_to_use: usize,

    /// How many search hits are fetched and scored
    #[serde(default = "default_papers_to_search")]
    pub papers_to_search: usize,

    /// Minimum relevance score (1-10) a paper needs to be kept
    #[serde(default = "default_threshold")]
    pub relevance_threshold: u8,

    /// Approximate length of the synthesis in words
    #[serde(default = "default_target_words")]
    pub target_words: usize,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            papers_to_use: default_papers_to_use(),
            papers_to_search: default_papers_to_search(),
            relevance_threshold: default_threshold(),
            target_words: default_target_words(),
        }
    }
}

impl SynthConfig {
    /// Check every bound, reporting the first violated one
    pub fn validate(&self) -> Result<()> {
        if self.papers_to_use < 1 {
            return Err(Error::InvalidConfig("papers_to_use must be >= 1".into()));
        }
        if self.papers_to_search < 1 {
            return Err(Error::InvalidConfig("papers_to_search must be >= 1".into()));
        }
        if self.target_words < 1 {
            return Err(Error::InvalidConfig("target_words must be >= 1".into()));
        }
        if !(1..=10).contains(&self.relevance_threshold) {
            return Err(Error::InvalidConfig(
                "relevance_threshold must be 1-10".into(),
            ));
        }
        if self.papers_to_use > self.papers_to_search {
            tracing::warn!(
                "papers_to_use ({}) exceeds papers_to_search ({})",
                self.papers_to_use,
                self.papers_to_search
            );
        }
        Ok(())
    }
}

fn default_papers_to_use() -> usize {
    5
}

fn default_papers_to_search() -> usize {
    30
}

fn default_threshold() -> u8 {
    7
}

fn default_target_words() -> usize {
    250
}

/// Options for [`AdaptiveAnswerEngine`](crate::qa::AdaptiveAnswerEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QaConfig {
    /// Self-rated confidence (1-10) at which the parametric answer is trusted
    #[serde(default = "default_threshold")]
    pub confidence_threshold: u8,

    /// Always consult the literature
    #[serde(default)]
    pub force_retrieval: bool,

    /// Never consult the literature (ignored when `force_retrieval` is set
    /// or the question looks novel)
    #[serde(default)]
    pub force_parametric: bool,

    /// Search hits fetched as evidence
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_threshold(),
            force_retrieval: false,
            force_parametric: false,
            max_results: default_max_results(),
        }
    }
}

impl QaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.confidence_threshold) {
            return Err(Error::InvalidConfig(
                "confidence_threshold must be 1-10".into(),
            ));
        }
        if self.max_results < 1 {
            return Err(Error::InvalidConfig("max_results must be >= 1".into()));
        }
        Ok(())
    }
}

fn default_max_results() -> usize {
    3
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Plain,
    /// One JSON object per event
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
