//! Text completion abstraction.
//!
//! The engines talk to a language model through the single-method
//! [`TextCompletionService`] trait. Backends (a direct HTTP client, a wrapper
//! around a vendor CLI, ...) are peer implementations of the trait and live
//! outside this crate. Retries belong in the backend or in
//! [`RetryingCompletion`](crate::utils::RetryingCompletion), never in the engines.

pub mod mock;

pub use mock::ScriptedCompletion;

use crate::sources::ServiceError;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A service that turns a prompt into a full text reply
#[async_trait]
pub trait TextCompletionService: Send + Sync + std::fmt::Debug {
    /// Complete `prompt`, producing at most roughly `max_tokens` tokens
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        cancel: &CancellationToken,
    ) -> Result<String, ServiceError>;
}

/// Rough token estimate for a piece of text (~4 bytes per token)
pub fn estimate_tokens(text: &str) -> usize {
    text.len() / 4
}
