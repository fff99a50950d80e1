//! Utility modules supporting the engines.
//!
//! - [`truncate`], [`take_chars`], [`flatten_whitespace`]: character-safe text helpers
//! - [`parse_score`]: extract a 1-10 score from a free-form model reply
//! - [`minify_abstract`]: keep the highest-signal sentences of an abstract
//! - [`run_cancellable`]: race a collaborator call against a cancellation token
//! - [`ProgressSink`], [`ChannelProgress`]: non-blocking progress reporting
//! - [`RetryConfig`], [`with_retry`], [`RetryingSource`], [`RetryingCompletion`]:
//!   exponential backoff for transient collaborator failures
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use pubmed_synth::sources::{MockLiteratureSource, LiteratureSource};
//! use pubmed_synth::utils::{api_retry_config, RetryingSource};
//! use pubmed_synth::models::SearchQuery;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let source = RetryingSource::new(MockLiteratureSource::new(), api_retry_config());
//! let hits = source.search(&SearchQuery::new("asthma"), &CancellationToken::new()).await?;
//! # Ok(())
//! # }
//! ```

mod cancel;
mod minify;
mod progress;
mod retry;
mod score;
mod text;

pub use cancel::run_cancellable;
pub use minify::minify_abstract;
pub(crate) use progress::Progress;
pub use progress::{ChannelProgress, ProgressSink};
pub use retry::{
    api_retry_config, with_retry, RetryConfig, RetrySettings, RetryingCompletion, RetryingSource,
    TransientError,
};
pub use score::{parse_score, DEFAULT_SCORE};
pub use text::{flatten_whitespace, take_chars, truncate};
