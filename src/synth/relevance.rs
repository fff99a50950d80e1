//! Relevance rating of a single paper against a research question.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result, Stage};
use crate::llm::{estimate_tokens, TextCompletionService};
use crate::models::{Paper, TokenCount};
use crate::sources::ServiceError;
use crate::utils::{parse_score, run_cancellable, truncate};

const ABSTRACT_CHARS: usize = 500;
const SCORE_MAX_TOKENS: usize = 10;

/// A paper's 1-10 relevance score and the tokens spent obtaining it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelevanceScore {
    pub score: u8,
    pub tokens: TokenCount,
}

fn relevance_prompt(question: &str, paper: &Paper) -> String {
    format!(
        "Rate how relevant this paper is to the research question.\n\
         \n\
         Question: {}\n\
         \n\
         Paper Title: {}\n\
         Abstract: {}\n\
         \n\
         Rate relevance from 1-10 where:\n\
         1-3 = Not relevant (different topic, population, or scope)\n\
         4-6 = Somewhat relevant (related but not directly addressing the question)\n\
         7-9 = Highly relevant (directly addresses the question)\n\
         10 = Perfect match (exactly what the question asks about)\n\
         \n\
         Respond with only the number (1-10):",
        question,
        paper.title,
        truncate(&paper.r#abstract, ABSTRACT_CHARS)
    )
}

/// Rates papers with the completion service
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    llm: Arc<dyn TextCompletionService>,
}

impl RelevanceScorer {
    pub fn new(llm: Arc<dyn TextCompletionService>) -> Self {
        Self { llm }
    }

    /// Rate how relevant `paper` is to `question`.
    ///
    /// Unparsable replies score 5. Completion failures are returned as
    /// errors, never replaced by a default score.
    pub async fn score(
        &self,
        question: &str,
        paper: &Paper,
        cancel: &CancellationToken,
    ) -> Result<RelevanceScore> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question is required".into()));
        }
        self.score_raw(question, paper, cancel)
            .await
            .map_err(|e| Error::completion(Stage::Score, e))
    }

    /// Like [`score`](Self::score) for an already validated question,
    /// keeping the collaborator error intact
    pub(crate) async fn score_raw(
        &self,
        question: &str,
        paper: &Paper,
        cancel: &CancellationToken,
    ) -> std::result::Result<RelevanceScore, ServiceError> {
        let prompt = relevance_prompt(question, paper);
        let reply = run_cancellable(
            cancel,
            self.llm.complete(&prompt, SCORE_MAX_TOKENS, cancel),
        )
        .await?;

        Ok(RelevanceScore {
            score: parse_score(&reply),
            tokens: TokenCount {
                input: estimate_tokens(&prompt),
                output: estimate_tokens(&reply).max(1),
            },
        })
    }
}
