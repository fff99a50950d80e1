//! # pubmed-synth
//!
//! Evidence-backed answers and literature syntheses for biomedical questions.
//!
//! The crate is built around two engines that share one literature source and
//! one text completion service, both supplied by the caller as trait objects:
//!
//! - [`AdaptiveAnswerEngine`] answers yes/no questions, retrieving evidence only
//!   when the question looks novel or the model is not confident.
//! - [`SynthesisEngine`] searches, scores and filters papers, then writes a
//!   cited synthesis with APA references and RIS/BibTeX exports.
//!
//! ## Modules
//!
//! - [`models`]: papers, queries and engine results
//! - [`sources`]: the [`LiteratureSource`] trait and a mock
//! - [`llm`]: the [`TextCompletionService`] trait and a scripted mock
//! - [`qa`] and [`synth`]: the two engines
//! - [`citation`]: APA, RIS and BibTeX formatting
//! - [`config`], [`logging`], [`utils`]: settings, tracing setup, retries and helpers
//!
//! ```no_run
//! use std::sync::Arc;
//! use pubmed_synth::{Config, SynthesisEngine};
//! use pubmed_synth::llm::ScriptedCompletion;
//! use pubmed_synth::sources::MockLiteratureSource;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> pubmed_synth::Result<()> {
//! let config = Config::default();
//! let engine = SynthesisEngine::new(
//!     Arc::new(ScriptedCompletion::reply("8")),
//!     Arc::new(MockLiteratureSource::new()),
//!     config.synthesis,
//! );
//! let result = engine
//!     .synthesize("Do statins cause myopathy?", &CancellationToken::new())
//!     .await?;
//! println!("{}", result.synthesis);
//! # Ok(())
//! # }
//! ```

pub mod citation;
pub mod config;
pub mod error;
pub mod llm;
pub mod logging;
pub mod models;
pub mod qa;
pub mod sources;
pub mod synth;
pub mod utils;

pub use config::{Config, QaConfig, SynthConfig};
pub use error::{Error, ErrorKind, Result, Stage};
pub use llm::TextCompletionService;
pub use models::{Paper, QaResult, Reference, SynthesisResult};
pub use qa::AdaptiveAnswerEngine;
pub use sources::{LiteratureSource, ServiceError};
pub use synth::SynthesisEngine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
