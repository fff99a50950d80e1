//! Scripted completion service for testing purposes.

use async_trait::async_trait;
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tokio_util::sync::CancellationToken;

use crate::llm::TextCompletionService;
use crate::sources::ServiceError;

type Responder = dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync;

/// A completion service whose replies are computed from the prompt by a closure.
///
/// Every prompt is recorded so tests can assert on what the engines asked.
pub struct ScriptedCompletion {
    responder: Box<Responder>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedCompletion {
    /// Reply with whatever `responder` returns for each prompt.
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(responder),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Reply with the same text to every prompt.
    pub fn reply(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(text.clone()))
    }

    /// Fail every call with `error`.
    pub fn failing(error: ServiceError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl fmt::Debug for ScriptedCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedCompletion")
            .field("calls", &self.calls())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TextCompletionService for ScriptedCompletion {
    async fn complete(
        &self,
        prompt: &str,
        _max_tokens: usize,
        cancel: &CancellationToken,
    ) -> Result<String, ServiceError> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }
        (self.responder)(prompt)
    }
}
