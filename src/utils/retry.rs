//! Retry utilities with exponential backoff for resilient collaborator calls.
//!
//! [`RetryingSource`] and [`RetryingCompletion`] wrap any literature source or
//! completion service so the engines can stay unaware of retries. Cancellation
//! is never retried and interrupts backoff sleeps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::llm::TextCompletionService;
use crate::models::{Paper, SearchQuery, SearchResponse};
use crate::sources::{LiteratureSource, ServiceError};

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first
    pub max_attempts: u32,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum total time to spend sleeping between attempts
    pub max_total_time: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            max_total_time: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Backoff delay before attempt `attempts + 1`
    fn backoff(&self, attempts: u32) -> Duration {
        if attempts <= 1 {
            return self.initial_delay.min(self.max_delay);
        }
        let exp = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powf(attempts as f64 - 1.0);
        Duration::from_secs_f64(exp.min(self.max_delay.as_secs_f64()))
    }
}

/// Retry settings as they appear in configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub max_total_time_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        let d = RetryConfig::default();
        Self {
            max_attempts: d.max_attempts,
            initial_delay_ms: d.initial_delay.as_millis() as u64,
            max_delay_ms: d.max_delay.as_millis() as u64,
            backoff_multiplier: d.backoff_multiplier,
            max_total_time_secs: d.max_total_time.as_secs(),
        }
    }
}

impl From<&RetrySettings> for RetryConfig {
    fn from(s: &RetrySettings) -> Self {
        Self {
            max_attempts: s.max_attempts.max(1),
            initial_delay: Duration::from_millis(s.initial_delay_ms),
            max_delay: Duration::from_millis(s.max_delay_ms),
            backoff_multiplier: s.backoff_multiplier,
            max_total_time: Duration::from_secs(s.max_total_time_secs),
        }
    }
}

/// Transient errors that should trigger a retry
#[derive(Debug, Clone, PartialEq)]
pub enum TransientError {
    /// Network connectivity issues
    Network,
    /// Rate limit exceeded
    RateLimit,
    /// Service temporarily unavailable
    ServiceUnavailable,
    /// Request timeout
    Timeout,
}

impl TransientError {
    /// Classify a collaborator error, `None` for permanent failures
    pub fn from_service_error(err: &ServiceError) -> Option<Self> {
        match err {
            ServiceError::RateLimit => Some(TransientError::RateLimit),
            ServiceError::Network(_) => Some(TransientError::Network),
            ServiceError::Timeout => Some(TransientError::Timeout),
            ServiceError::Api(msg) => {
                let msg_lower = msg.to_lowercase();
                if msg_lower.contains("timeout") {
                    Some(TransientError::Timeout)
                } else if msg_lower.contains("service unavailable")
                    || msg_lower.contains("temporarily unavailable")
                {
                    Some(TransientError::ServiceUnavailable)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Get the recommended minimum delay for this error
    pub fn recommended_delay(&self) -> Duration {
        match self {
            TransientError::RateLimit => Duration::from_secs(61),
            TransientError::ServiceUnavailable => Duration::from_secs(10),
            TransientError::Timeout => Duration::from_secs(2),
            TransientError::Network => Duration::from_secs(2),
        }
    }
}

/// Execute an async operation with retry logic
///
/// Permanent errors and [`ServiceError::Cancelled`] are returned at once.
/// Transient errors are retried with exponential backoff, never shorter than
/// the error's recommended delay, until `max_attempts` or `max_total_time` is
/// reached. Backoff sleeps end early with `Cancelled` when `cancel` fires.
pub async fn with_retry<T, F, Fut>(
    config: RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempts = 0;
    let mut total_elapsed = Duration::ZERO;

    loop {
        attempts += 1;

        let error = match operation().await {
            Ok(result) => {
                if attempts > 1 {
                    tracing::info!(
                        "Operation succeeded on attempt {} after {} transient failures",
                        attempts,
                        attempts - 1
                    );
                }
                return Ok(result);
            }
            Err(error) => error,
        };

        let Some(transient) = TransientError::from_service_error(&error) else {
            return Err(error);
        };

        let delay = std::cmp::max(config.backoff(attempts), transient.recommended_delay());
        total_elapsed += delay;

        if attempts >= config.max_attempts || total_elapsed >= config.max_total_time {
            tracing::warn!(
                "Operation failed after {} attempts (total elapsed: {:?}): {}",
                attempts,
                total_elapsed,
                error
            );
            return Err(error);
        }

        tracing::debug!(
            "Transient error on attempt {}: {:?}, retrying in {:?}",
            attempts,
            transient,
            delay
        );

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ServiceError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
    }
}

/// Create a retry configuration suited to public literature APIs
pub fn api_retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 5,
        initial_delay: Duration::from_secs(2),
        max_delay: Duration::from_secs(120),
        backoff_multiplier: 2.0,
        max_total_time: Duration::from_secs(300),
    }
}

/// A [`LiteratureSource`] that retries transient failures of the inner source
#[derive(Debug)]
pub struct RetryingSource<S> {
    inner: S,
    config: RetryConfig,
}

impl<S> RetryingSource<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: LiteratureSource> LiteratureSource for RetryingSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn search(
        &self,
        query: &SearchQuery,
        cancel: &CancellationToken,
    ) -> Result<SearchResponse, ServiceError> {
        with_retry(self.config, cancel, || self.inner.search(query, cancel)).await
    }

    async fn fetch(
        &self,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<Paper>, ServiceError> {
        with_retry(self.config, cancel, || self.inner.fetch(ids, cancel)).await
    }
}

/// A [`TextCompletionService`] that retries transient failures of the inner service
#[derive(Debug)]
pub struct RetryingCompletion<C> {
    inner: C,
    config: RetryConfig,
}

impl<C> RetryingCompletion<C> {
    pub fn new(inner: C, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: TextCompletionService> TextCompletionService for RetryingCompletion<C> {
    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        cancel: &CancellationToken,
    ) -> Result<String, ServiceError> {
        with_retry(self.config, cancel, || {
            self.inner.complete(prompt, max_tokens, cancel)
        })
        .await
    }
}
