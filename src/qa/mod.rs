//! Adaptive retrieval for yes/no biomedical questions.
//!
//! The [`AdaptiveAnswerEngine`] decides per question whether the model can
//! answer from its own knowledge or whether literature evidence is needed:
//!
//! 1. Forced retrieval, or a question that looks novel ([`detect_novelty`]),
//!    always retrieves.
//! 2. Forced-parametric mode answers directly.
//! 3. Otherwise the model rates its own confidence; at or above the threshold
//!    its answer is used, below it the engine retrieves.
//!
//! Retrieval searches with [`expand_query`], minifies each abstract to a
//! short evidence block and asks the final question with that evidence.

mod engine;
mod novelty;
mod query;

pub use crate::config::QaConfig;
pub use engine::AdaptiveAnswerEngine;
pub use novelty::detect_novelty;
pub use query::expand_query;
