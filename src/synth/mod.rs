//! Literature synthesis.
//!
//! [`SynthesisEngine::synthesize`] runs search, fetch, per-paper relevance
//! scoring, threshold filtering and composition of a cited narrative. The
//! result carries APA references with collision-free keys and a RIS export.
//! [`SynthesisEngine::deep_dive`] summarizes a single paper by PMID.

mod engine;
mod relevance;

pub use crate::config::SynthConfig;
pub use engine::SynthesisEngine;
pub use relevance::{RelevanceScore, RelevanceScorer};
