//! Adaptive yes/no answering: answer from the model's own knowledge when it
//! is confident, consult the literature otherwise.

use regex::Regex;
use std::num::IntErrorKind;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;

use super::{detect_novelty, expand_query};
use crate::config::QaConfig;
use crate::error::{Error, Result, Stage};
use crate::llm::TextCompletionService;
use crate::models::{Answer, Paper, QaResult, SearchQuery, Strategy};
use crate::sources::LiteratureSource;
use crate::utils::{minify_abstract, run_cancellable};

/// Confidence assumed when the model does not report one
const DEFAULT_CONFIDENCE: u8 = 5;
const CONFIDENCE_MAX_TOKENS: usize = 50;
const ANSWER_MAX_TOKENS: usize = 10;
const EVIDENCE_CHARS_PER_PAPER: usize = 400;

fn integer_regex() -> &'static Regex {
    static INT_RE: OnceLock<Regex> = OnceLock::new();
    INT_RE.get_or_init(|| Regex::new(r"[0-9]+").expect("valid integer regex"))
}

/// Self-rated confidence from the first `confidence ...: N` line, clamped to 1-10
fn parse_confidence(reply: &str) -> u8 {
    let lower = reply.to_lowercase();
    let Some(line) = lower
        .lines()
        .find(|line| line.contains("confidence") && line.contains(':'))
    else {
        return DEFAULT_CONFIDENCE;
    };
    let after_colon = line.rsplit(':').next().unwrap_or("");
    integer_regex()
        .find(after_colon)
        .and_then(|m| match m.as_str().parse::<u64>() {
            Ok(n) => Some(n.clamp(1, 10) as u8),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(10),
            Err(_) => None,
        })
        .unwrap_or(DEFAULT_CONFIDENCE)
}

/// Answer lean from the `answer ...: X` line, falling back to the whole reply
fn parse_lean(reply: &str) -> Answer {
    let lean = reply
        .lines()
        .find(|line| line.to_lowercase().contains("answer"))
        .and_then(|line| line.rsplit_once(':'))
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty());
    Answer::from_reply(lean.unwrap_or(reply))
}

fn confidence_prompt(question: &str) -> String {
    format!(
        "Answer this biomedical question.\n\
         CONFIDENCE (1-10):\n\
         ANSWER (yes/no):\n\
         \n\
         Question: {}",
        question
    )
}

fn parametric_prompt(question: &str) -> String {
    format!("Answer yes or no: {}\nANSWER:", question)
}

fn evidence_prompt(question: &str, evidence: &str) -> String {
    format!(
        "Question: {}\n\
         \n\
         Evidence from PubMed:\n\
         {}\n\
         \n\
         Based on this evidence, answer yes or no.\n\
         ANSWER:",
        question, evidence
    )
}

/// `**Title**` followed by the minified abstract, one block per paper
fn build_evidence(papers: &[Paper]) -> String {
    papers
        .iter()
        .map(|p| {
            format!(
                "**{}**\n{}",
                p.title,
                minify_abstract(&p.r#abstract, EVIDENCE_CHARS_PER_PAPER)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Answers yes/no biomedical questions, retrieving evidence only when needed
#[derive(Debug, Clone)]
pub struct AdaptiveAnswerEngine {
    llm: Arc<dyn TextCompletionService>,
    source: Arc<dyn LiteratureSource>,
    config: QaConfig,
}

impl AdaptiveAnswerEngine {
    pub fn new(
        llm: Arc<dyn TextCompletionService>,
        source: Arc<dyn LiteratureSource>,
        config: QaConfig,
    ) -> Self {
        Self {
            llm,
            source,
            config,
        }
    }

    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Answer `question` with yes or no.
    ///
    /// Forced retrieval and novel questions always consult the literature.
    /// Otherwise forced-parametric mode answers directly, and the default
    /// mode asks the model for a self-rated confidence first, retrieving only
    /// when it falls below the threshold.
    pub async fn answer(&self, question: &str, cancel: &CancellationToken) -> Result<QaResult> {
        self.config.validate()?;
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::InvalidInput("question is required".into()));
        }

        let novel_detected = detect_novelty(question);
        let mut result = QaResult {
            question: question.to_string(),
            answer: Answer::No,
            confidence: 0,
            strategy: Strategy::Retrieval,
            novel_detected,
            source_pmids: Vec::new(),
            minified_context: None,
        };

        if self.config.force_retrieval || novel_detected {
            tracing::debug!(novel_detected, "Retrieval forced");
        } else if self.config.force_parametric {
            result.strategy = Strategy::Parametric;
            result.answer = self.answer_parametric(question, cancel).await?;
            return Ok(result);
        } else {
            let (lean, confidence) = self.check_confidence(question, cancel).await?;
            result.confidence = confidence;
            if confidence >= self.config.confidence_threshold {
                tracing::debug!(confidence, "Confident enough to answer parametrically");
                result.strategy = Strategy::Parametric;
                result.answer = lean;
                return Ok(result);
            }
            tracing::debug!(
                confidence,
                threshold = self.config.confidence_threshold,
                "Low confidence, retrieving evidence"
            );
        }

        self.answer_with_retrieval(result, cancel).await
    }

    async fn complete(
        &self,
        prompt: &str,
        max_tokens: usize,
        stage: Stage,
        cancel: &CancellationToken,
    ) -> Result<String> {
        run_cancellable(cancel, self.llm.complete(prompt, max_tokens, cancel))
            .await
            .map_err(|e| Error::completion(stage, e))
    }

    async fn check_confidence(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<(Answer, u8)> {
        let reply = self
            .complete(
                &confidence_prompt(question),
                CONFIDENCE_MAX_TOKENS,
                Stage::Confidence,
                cancel,
            )
            .await?;
        Ok((parse_lean(&reply), parse_confidence(&reply)))
    }

    async fn answer_parametric(&self, question: &str, cancel: &CancellationToken) -> Result<Answer> {
        let reply = self
            .complete(&parametric_prompt(question), ANSWER_MAX_TOKENS, Stage::Answer, cancel)
            .await?;
        Ok(Answer::from_reply(&reply))
    }

    async fn answer_with_retrieval(
        &self,
        mut result: QaResult,
        cancel: &CancellationToken,
    ) -> Result<QaResult> {
        let query = SearchQuery::new(expand_query(&result.question)).limit(self.config.max_results);
        tracing::debug!(query = %query.query, "Searching for evidence");

        let hits = run_cancellable(cancel, self.source.search(&query, cancel))
            .await
            .map_err(|e| Error::retrieval(Stage::Search, e))?;

        if hits.ids.is_empty() {
            tracing::debug!("No evidence found, falling back to a parametric answer");
            result.answer = self
                .answer_parametric(&result.question, cancel)
                .await?;
            return Ok(result);
        }

        let papers = run_cancellable(cancel, self.source.fetch(&hits.ids, cancel))
            .await
            .map_err(|e| Error::retrieval(Stage::Fetch, e))?;
        result.source_pmids = hits.ids;

        let evidence = build_evidence(&papers);
        let reply = self
            .complete(
                &evidence_prompt(&result.question, &evidence),
                ANSWER_MAX_TOKENS,
                Stage::Answer,
                cancel,
            )
            .await?;

        result.answer = Answer::from_reply(&reply);
        result.minified_context = Some(evidence);
        tracing::info!(
            answer = %result.answer,
            sources = result.source_pmids.len(),
            "Answered with retrieval"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedCompletion;
    use crate::sources::mock::make_paper;
    use crate::sources::{MockLiteratureSource, ServiceError};

    fn build(
        llm: ScriptedCompletion,
        source: MockLiteratureSource,
        config: QaConfig,
    ) -> (AdaptiveAnswerEngine, Arc<ScriptedCompletion>, Arc<MockLiteratureSource>) {
        let llm = Arc::new(llm);
        let source = Arc::new(source);
        let engine = AdaptiveAnswerEngine::new(llm.clone(), source.clone(), config);
        (engine, llm, source)
    }

    fn papers() -> Vec<Paper> {
        vec![make_paper("11", "Fasting trial"), make_paper("22", "Cohort study")]
    }

    #[test]
    fn test_parse_confidence() {
        assert_eq!(parse_confidence("CONFIDENCE (1-10): 8\nANSWER (yes/no): yes"), 8);
        assert_eq!(parse_confidence("Confidence: 15"), 10);
        assert_eq!(parse_confidence("confidence: 0"), 1);
        assert_eq!(parse_confidence("confidence: high"), DEFAULT_CONFIDENCE);
        assert_eq!(parse_confidence("I am fairly sure. 9"), DEFAULT_CONFIDENCE);
        assert_eq!(parse_confidence("Confidence: 99999999999999999999999"), 10);
        assert_eq!(parse_confidence("Confidence: ٩"), DEFAULT_CONFIDENCE);
        assert_eq!(parse_confidence("Confidence: ９ or 3"), 3);
    }

    #[test]
    fn test_parse_lean() {
        assert_eq!(parse_lean("CONFIDENCE (1-10): 8\nANSWER (yes/no): no"), Answer::No);
        assert_eq!(parse_lean("CONFIDENCE: 8\nANSWER: Yes"), Answer::Yes);
        assert_eq!(parse_lean("Yes, with confidence 9"), Answer::Yes);
        assert_eq!(parse_lean("ANSWER (yes/no):"), Answer::Yes);
    }

    #[tokio::test]
    async fn test_confident_parametric_skips_retrieval() {
        let (engine, llm, source) = build(
            ScriptedCompletion::reply("CONFIDENCE: 9\nANSWER: yes"),
            MockLiteratureSource::with_papers(papers()),
            QaConfig::default(),
        );
        let result = engine
            .answer("Does aspirin reduce stroke risk?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::Parametric);
        assert_eq!(result.answer, Answer::Yes);
        assert_eq!(result.confidence, 9);
        assert!(!result.novel_detected);
        assert!(result.source_pmids.is_empty());
        assert_eq!(llm.calls(), 1);
        assert_eq!(source.search_calls(), 0);
        assert_eq!(source.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn test_low_confidence_retrieves() {
        let (engine, llm, source) = build(
            ScriptedCompletion::new(|prompt| {
                if prompt.contains("CONFIDENCE") {
                    Ok("CONFIDENCE: 4\nANSWER: no".into())
                } else {
                    Ok("Yes".into())
                }
            }),
            MockLiteratureSource::with_papers(papers()),
            QaConfig::default(),
        );
        let result = engine
            .answer("Does fasting lower HbA1c?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(result.confidence, 4);
        assert_eq!(result.answer, Answer::Yes);
        assert_eq!(result.source_pmids, vec!["11", "22"]);
        let context = result.minified_context.unwrap();
        assert!(context.starts_with("**Fasting trial**\n"));
        assert!(context.contains("\n\n**Cohort study**\n"));

        assert_eq!(source.queries()[0].query, "fasting lower HbA1c");
        assert_eq!(source.queries()[0].limit, 3);
        let prompts = llm.prompts();
        assert!(prompts[1].contains("Evidence from PubMed:\n**Fasting trial**"));
    }

    #[tokio::test]
    async fn test_novel_question_always_retrieves() {
        let (engine, llm, source) = build(
            ScriptedCompletion::reply("no"),
            MockLiteratureSource::with_papers(papers()),
            QaConfig {
                force_parametric: true,
                ..Default::default()
            },
        );
        let result = engine
            .answer(
                "According to a 2025 meta-analysis, does X reduce Y?",
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert!(result.novel_detected);
        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(result.confidence, 0);
        assert_eq!(source.search_calls(), 1);
        assert_eq!(source.queries()[0].query, "X reduce Y");
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_novel_question_skips_confidence_check() {
        let (engine, llm, source) = build(
            ScriptedCompletion::new(|prompt| {
                if prompt.contains("CONFIDENCE") {
                    Ok("CONFIDENCE: 9\nANSWER: no".into())
                } else {
                    Ok("Yes".into())
                }
            }),
            MockLiteratureSource::with_papers(papers()),
            QaConfig::default(),
        );
        let result = engine
            .answer("Did a 2025 trial show benefit?", &CancellationToken::new())
            .await
            .unwrap();

        assert!(result.novel_detected);
        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(result.confidence, 0);
        assert_eq!(result.answer, Answer::Yes);
        assert_eq!(llm.calls(), 1);
        assert!(!llm.prompts()[0].contains("CONFIDENCE"));
        assert_eq!(source.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_unreadable_confidence_digit_retrieves() {
        let (engine, _llm, source) = build(
            ScriptedCompletion::new(|prompt| {
                if prompt.contains("CONFIDENCE") {
                    Ok("CONFIDENCE: ٩\nANSWER: no".into())
                } else {
                    Ok("Yes".into())
                }
            }),
            MockLiteratureSource::with_papers(papers()),
            QaConfig::default(),
        );
        let result = engine
            .answer("Does fasting lower HbA1c?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(source.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_force_parametric() {
        let (engine, llm, source) = build(
            ScriptedCompletion::reply("No."),
            MockLiteratureSource::with_papers(papers()),
            QaConfig {
                force_parametric: true,
                ..Default::default()
            },
        );
        let result = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::Parametric);
        assert_eq!(result.answer, Answer::No);
        assert_eq!(llm.prompts()[0], "Answer yes or no: Is water wet?\nANSWER:");
        assert_eq!(source.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_force_retrieval_wins_over_force_parametric() {
        let (engine, _llm, source) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::with_papers(papers()),
            QaConfig {
                force_retrieval: true,
                force_parametric: true,
                ..Default::default()
            },
        );
        let result = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(source.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn test_zero_hits_falls_back_to_parametric_prompt() {
        let (engine, llm, source) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::new(),
            QaConfig {
                force_retrieval: true,
                ..Default::default()
            },
        );
        let result = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(result.strategy, Strategy::Retrieval);
        assert_eq!(result.answer, Answer::Yes);
        assert!(result.source_pmids.is_empty());
        assert!(result.minified_context.is_none());
        assert_eq!(source.fetch_calls(), 0);
        assert!(llm.prompts()[0].starts_with("Answer yes or no:"));
    }

    #[tokio::test]
    async fn test_errors_carry_stage() {
        let (engine, _, _) = build(
            ScriptedCompletion::failing(ServiceError::Api("quota".into())),
            MockLiteratureSource::new(),
            QaConfig::default(),
        );
        let err = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Confidence));

        let (engine, _, _) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::new().fail_search(ServiceError::Network("down".into())),
            QaConfig {
                force_retrieval: true,
                ..Default::default()
            },
        );
        let err = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Search));

        let (engine, _, _) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::with_papers(papers())
                .fail_fetch(ServiceError::Api("bad gateway".into())),
            QaConfig {
                force_retrieval: true,
                ..Default::default()
            },
        );
        let err = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Fetch));

        let (engine, _, _) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::with_papers(papers()).fail_fetch(ServiceError::Cancelled),
            QaConfig {
                force_retrieval: true,
                ..Default::default()
            },
        );
        let err = engine
            .answer("Is water wet?", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_invalid_input() {
        let (engine, llm, _) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::new(),
            QaConfig::default(),
        );
        let err = engine.answer("   ", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(llm.calls(), 0);

        let (engine, _, _) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::new(),
            QaConfig {
                max_results: 0,
                ..Default::default()
            },
        );
        let err = engine.answer("q", &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let (engine, _, source) = build(
            ScriptedCompletion::reply("yes"),
            MockLiteratureSource::with_papers(papers()),
            QaConfig {
                force_retrieval: true,
                ..Default::default()
            },
        );
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = engine.answer("Is water wet?", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(source.search_calls(), 0);
    }
}
