//! Literature synthesis pipeline: search, fetch, score, filter, compose.

use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::RelevanceScorer;
use crate::citation::{build_references, generate_ris, in_text_key};
use crate::config::SynthConfig;
use crate::error::{Error, Result, Stage};
use crate::llm::{estimate_tokens, TextCompletionService};
use crate::models::{
    Paper, ProgressPhase, ProgressUpdate, ScoredPaper, SearchQuery, SynthesisResult, TokenCount,
    TokenUsage,
};
use crate::sources::{LiteratureSource, ServiceError};
use crate::utils::{run_cancellable, truncate, Progress, ProgressSink, DEFAULT_SCORE};

const COMPOSE_ABSTRACT_CHARS: usize = 1500;
const DEEP_DIVE_ABSTRACT_CHARS: usize = 2500;
const DEEP_DIVE_RELEVANCE: u8 = 10;

fn or_placeholder<'a>(text: &'a str, placeholder: &'a str) -> &'a str {
    let text = text.trim();
    if text.is_empty() {
        placeholder
    } else {
        text
    }
}

/// Drop records that were not requested, and repeats of ones that were
fn keep_requested(papers: Vec<Paper>, ids: &[String]) -> Vec<Paper> {
    let mut pending: HashSet<&str> = ids.iter().map(String::as_str).collect();
    papers
        .into_iter()
        .filter(|p| pending.remove(p.pmid.as_str()))
        .collect()
}

fn compose_prompt(question: &str, papers: &[ScoredPaper], target_words: usize) -> String {
    let keys: Vec<String> = papers.iter().map(|sp| in_text_key(&sp.paper)).collect();
    let blocks: Vec<String> = papers
        .iter()
        .zip(&keys)
        .enumerate()
        .map(|(i, (sp, key))| {
            let abstract_text = or_placeholder(&sp.paper.r#abstract, "(no abstract available)");
            format!(
                "[{}] {} ({})\nTitle: {}\nAbstract: {}\n",
                i + 1,
                key,
                sp.paper.pmid,
                sp.paper.title,
                truncate(abstract_text, COMPOSE_ABSTRACT_CHARS)
            )
        })
        .collect();

    format!(
        "You are a scientific writer. Synthesize the following research papers to answer this question:\n\
         \n\
         Question: {}\n\
         \n\
         Papers:\n\
         {}\n\
         \n\
         Write a synthesis of approximately {} words that:\n\
         1. Directly addresses the question\n\
         2. Integrates findings across papers\n\
         3. Uses inline citations like (Smith et al., 2024)\n\
         4. Maintains academic tone\n\
         5. Notes any conflicting findings\n\
         \n\
         Available citations: {}\n\
         \n\
         Write the synthesis:",
        question,
        blocks.join("\n---\n"),
        target_words,
        keys.join("; ")
    )
}

fn deep_dive_prompt(paper: &Paper, target_words: usize) -> String {
    format!(
        "Summarize this research paper in approximately {} words. Include:\n\
         - Main objective/question\n\
         - Key methods\n\
         - Primary findings\n\
         - Implications/conclusions\n\
         \n\
         Title: {}\n\
         \n\
         Abstract:\n\
         {}\n\
         \n\
         Write a cohesive summary paragraph. Cite as ({}).",
        target_words,
        or_placeholder(&paper.title, "(no title available)"),
        truncate(
            or_placeholder(&paper.r#abstract, "(no abstract available)"),
            DEEP_DIVE_ABSTRACT_CHARS
        ),
        in_text_key(paper)
    )
}

/// Produces cited narrative syntheses from the literature
#[derive(Debug, Clone)]
pub struct SynthesisEngine {
    llm: Arc<dyn TextCompletionService>,
    source: Arc<dyn LiteratureSource>,
    scorer: RelevanceScorer,
    config: SynthConfig,
    progress: Progress,
}

impl SynthesisEngine {
    pub fn new(
        llm: Arc<dyn TextCompletionService>,
        source: Arc<dyn LiteratureSource>,
        config: SynthConfig,
    ) -> Self {
        Self {
            scorer: RelevanceScorer::new(llm.clone()),
            llm,
            source,
            config,
            progress: Progress::default(),
        }
    }

    /// Attach a progress sink. Sinks must not block.
    pub fn with_progress(mut self, sink: impl ProgressSink + 'static) -> Self {
        self.progress = Progress::new(Arc::new(sink));
        self
    }

    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    fn report(&self, phase: ProgressPhase, message: impl Into<String>) {
        self.progress.report(ProgressUpdate::new(phase, message));
    }

    /// Run the full pipeline for `question`.
    ///
    /// Individual scoring failures count as a neutral score of 5; only a
    /// batch where every paper failed aborts. Cancellation aborts at once.
    pub async fn synthesize(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<SynthesisResult> {
        self.config.validate()?;
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question is required".into()));
        }

        let mut result = SynthesisResult {
            question: question.to_string(),
            ..Default::default()
        };

        self.report(ProgressPhase::Search, "Searching PubMed...");
        let query = SearchQuery::new(question).limit(self.config.papers_to_search);
        let hits = run_cancellable(cancel, self.source.search(&query, cancel))
            .await
            .map_err(|e| Error::retrieval(Stage::Search, e))?;
        result.papers_searched = hits.ids.len();
        if hits.ids.is_empty() {
            return Err(Error::NoResults(question.to_string()));
        }
        tracing::debug!(hits = hits.ids.len(), total = ?hits.total_count, "Search complete");

        self.report(ProgressPhase::Fetch, "Fetching paper metadata...");
        let papers = run_cancellable(cancel, self.source.fetch(&hits.ids, cancel))
            .await
            .map_err(|e| Error::retrieval(Stage::Fetch, e))?;
        let fetched = papers.len();
        let papers = keep_requested(papers, &hits.ids);
        if papers.len() < fetched {
            tracing::debug!(dropped = fetched - papers.len(), "Ignoring unrequested records");
        }
        if papers.is_empty() {
            return Err(Error::FetchEmpty(question.to_string()));
        }

        let (scored, scoring_tokens) = self.score_papers(question, papers, cancel).await?;
        result.papers_scored = scored.len();
        result.tokens += scoring_tokens;

        self.report(
            ProgressPhase::Filter,
            format!("Filtering to top {} papers...", self.config.papers_to_use),
        );
        let relevant = self.select(scored);
        if relevant.is_empty() {
            return Err(Error::ThresholdNotMet {
                threshold: self.config.relevance_threshold,
                question: question.to_string(),
            });
        }
        result.papers_used = relevant.len();
        result.references = build_references(&relevant);

        self.report(ProgressPhase::Synthesis, "Generating synthesis...");
        let prompt = compose_prompt(question, &relevant, self.config.target_words);
        let (synthesis, tokens) = self
            .compose(&prompt, self.config.target_words * 3, cancel)
            .await?;
        result.synthesis = synthesis;
        result.tokens += tokens;

        self.report(ProgressPhase::CitationExport, "Generating RIS...");
        result.ris = generate_ris(&result.references);
        result.tokens.finalize();

        tracing::info!(
            searched = result.papers_searched,
            scored = result.papers_scored,
            used = result.papers_used,
            tokens = result.tokens.total,
            "Synthesis complete"
        );
        Ok(result)
    }

    /// Summarize a single paper by PMID
    pub async fn deep_dive(&self, pmid: &str, cancel: &CancellationToken) -> Result<SynthesisResult> {
        self.config.validate()?;
        let pmid = pmid.trim();
        if pmid.is_empty() {
            return Err(Error::InvalidInput("pmid is required".into()));
        }

        self.report(ProgressPhase::Fetch, format!("Fetching PMID {}...", pmid));
        let ids = [pmid.to_string()];
        let paper = run_cancellable(cancel, self.source.fetch(&ids, cancel))
            .await
            .map_err(|e| Error::retrieval(Stage::Fetch, e))?
            .into_iter()
            .find(|p| p.pmid == pmid)
            .ok_or_else(|| Error::PaperNotFound(pmid.to_string()))?;

        self.report(ProgressPhase::Synthesis, "Generating summary...");
        let prompt = deep_dive_prompt(&paper, self.config.target_words);
        let (synthesis, tokens) = self
            .compose(&prompt, self.config.target_words * 2, cancel)
            .await?;

        let references = build_references(&[ScoredPaper {
            paper,
            relevance_score: DEEP_DIVE_RELEVANCE,
        }]);

        self.report(ProgressPhase::CitationExport, "Generating RIS...");
        let mut result = SynthesisResult {
            question: format!("Deep dive: PMID {}", pmid),
            synthesis,
            papers_searched: 1,
            papers_scored: 1,
            papers_used: 1,
            ris: generate_ris(&references),
            references,
            tokens: TokenUsage::default(),
        };
        result.tokens += tokens;
        result.tokens.finalize();
        Ok(result)
    }

    /// Score every paper in order, absorbing individual failures
    async fn score_papers(
        &self,
        question: &str,
        papers: Vec<Paper>,
        cancel: &CancellationToken,
    ) -> Result<(Vec<ScoredPaper>, TokenCount)> {
        let total = papers.len();
        let mut tokens = TokenCount::default();
        let mut scored = Vec::with_capacity(total);
        let mut first_error: Option<ServiceError> = None;
        let mut error_count = 0;

        for (i, paper) in papers.into_iter().enumerate() {
            let message = format!("Scoring paper {}/{} for relevance...", i + 1, total);
            self.progress.report(
                ProgressUpdate::new(ProgressPhase::Score, message.clone()).with_counts(i, total),
            );

            let relevance_score = match self.scorer.score_raw(question, &paper, cancel).await {
                Ok(rated) => {
                    tokens.input += rated.tokens.input;
                    tokens.output += rated.tokens.output;
                    tracing::debug!(pmid = %paper.pmid, score = rated.score, "Scored paper");
                    rated.score
                }
                Err(e) if e.is_cancelled() || cancel.is_cancelled() => {
                    return Err(Error::Cancelled);
                }
                Err(e) => {
                    tracing::warn!(
                        pmid = %paper.pmid,
                        error = %e,
                        "Relevance scoring failed, using neutral score"
                    );
                    error_count += 1;
                    first_error.get_or_insert(e);
                    DEFAULT_SCORE
                }
            };
            scored.push(ScoredPaper {
                paper,
                relevance_score,
            });

            self.progress.report(
                ProgressUpdate::new(ProgressPhase::Score, message).with_counts(i + 1, total),
            );
        }

        if error_count == total {
            if let Some(source) = first_error {
                return Err(Error::AllScoringFailed {
                    count: error_count,
                    source,
                });
            }
        }
        Ok((scored, tokens))
    }

    /// Keep papers at or above the threshold, best first, up to `papers_to_use`
    fn select(&self, scored: Vec<ScoredPaper>) -> Vec<ScoredPaper> {
        let mut relevant: Vec<ScoredPaper> = scored
            .into_iter()
            .filter(|sp| sp.relevance_score >= self.config.relevance_threshold)
            .collect();
        // Stable: ties keep search order.
        relevant.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        relevant.truncate(self.config.papers_to_use);
        relevant
    }

    /// Ask for a synthesis and reject blank replies
    async fn compose(
        &self,
        prompt: &str,
        max_tokens: usize,
        cancel: &CancellationToken,
    ) -> Result<(String, TokenCount)> {
        let reply = run_cancellable(cancel, self.llm.complete(prompt, max_tokens, cancel))
            .await
            .map_err(|e| Error::completion(Stage::Synthesis, e))?;
        let synthesis = reply.trim();
        if synthesis.is_empty() {
            return Err(Error::EmptySynthesis);
        }
        let tokens = TokenCount {
            input: estimate_tokens(prompt),
            output: estimate_tokens(synthesis),
        };
        Ok((synthesis.to_string(), tokens))
    }
}
