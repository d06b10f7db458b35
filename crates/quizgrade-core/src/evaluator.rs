//! Answer evaluator.
//!
//! Scores one free-text answer against a question's rubric by asking a
//! text-generation provider for a JSON verdict. `evaluate` is infallible:
//! blank answers short-circuit locally, and every provider, timeout, or
//! parsing failure becomes a zero-score sentinel carrying the error text.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::error::ProviderError;
use crate::extract::{extract_json_object, number_or_default, text_or_empty};
use crate::model::{round_one_decimal, Evaluation, Question, MAX_SCORE, MIN_SCORE};
use crate::traits::{GenerateRequest, LlmProvider};

/// Rationale stored for empty or whitespace-only answers.
pub const NO_ANSWER_RATIONALE: &str = "No answer provided.";

/// Prefix of the rationale stored when scoring fails.
pub const EVALUATION_FAILED_PREFIX: &str = "Evaluation failed";

/// System instruction sent with every grading prompt.
pub const GRADER_SYSTEM_PROMPT: &str =
    "You grade interview answers. Reply with a single JSON object and nothing else.";

/// Settings for the evaluator.
#[derive(Debug, Clone)]
pub struct EvaluatorConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Subject the interviewer is an expert in (e.g. "Excel").
    pub subject: String,
    /// Max tokens for the verdict.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f64,
    /// Upper bound on a single provider call.
    pub timeout: Duration,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash-latest".to_string(),
            subject: "Excel".to_string(),
            max_tokens: 1024,
            temperature: 0.0,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Scores answers with an LLM.
pub struct Evaluator {
    provider: Arc<dyn LlmProvider>,
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(provider: Arc<dyn LlmProvider>, config: EvaluatorConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Score `answer` against `question`. Never fails.
    #[instrument(skip(self, question, answer), fields(question_id = %question.id))]
    pub async fn evaluate(&self, question: &Question, answer: &str) -> Evaluation {
        if answer.trim().is_empty() {
            return Evaluation::new(MIN_SCORE, NO_ANSWER_RATIONALE);
        }

        match self.try_evaluate(question, answer).await {
            Ok(evaluation) => evaluation,
            Err(e) => {
                warn!(provider = self.provider.name(), "evaluation failed: {e:#}");
                Evaluation::sentinel(format!("{EVALUATION_FAILED_PREFIX}: {e:#}"))
            }
        }
    }

    async fn try_evaluate(&self, question: &Question, answer: &str) -> Result<Evaluation> {
        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(&self.config.subject, question, answer),
            system_prompt: Some(GRADER_SYSTEM_PROMPT.to_string()),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let start = Instant::now();
        let response = tokio::time::timeout(self.config.timeout, self.provider.generate(&request))
            .await
            .map_err(|_| ProviderError::Timeout(self.config.timeout.as_secs()))??;

        let extracted = extract_json_object(&response.content)?;
        debug!(
            stage = ?extracted.stage,
            latency_ms = start.elapsed().as_millis() as u64,
            "parsed verdict"
        );

        Ok(verdict_to_evaluation(&extracted.object))
    }
}

/// Turn a parsed verdict object into an evaluation.
///
/// Non-numeric scores fall back to the default; the result is clamped to the
/// rubric range and rounded to one decimal place.
fn verdict_to_evaluation(object: &serde_json::Map<String, serde_json::Value>) -> Evaluation {
    let score = number_or_default(object.get("score")).clamp(MIN_SCORE, MAX_SCORE);
    Evaluation::new(
        round_one_decimal(score),
        text_or_empty(object.get("rationale")),
    )
}

/// Build the grading prompt for one answer.
pub fn build_prompt(subject: &str, question: &Question, answer: &str) -> String {
    format!(
        "You are an expert {subject} interviewer. Evaluate the candidate's answer.\n\
         Return STRICT JSON only, with no text before or after it.\n\
         \n\
         Question: {question}\n\
         Answer: {answer}\n\
         \n\
         Expected Answer Description:\n\
         {expected}\n\
         \n\
         Evaluation Criteria:\n\
         {criteria}\n\
         \n\
         Respond with exactly this shape:\n\
         {{\n  \"score\": number (0-5),\n  \"rationale\": \"string\"\n}}\n",
        question = question.question,
        expected = question.expected_answer_description,
        criteria = question.evaluation_criteria,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{GenerateResponse, ModelInfo, TokenUsage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum Reply {
        Text(&'static str),
        Fail(&'static str),
        Hang,
    }

    struct StubProvider {
        reply: Reply,
        calls: AtomicU32,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl LlmProvider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match self.reply {
                Reply::Text(text) => Ok(GenerateResponse {
                    content: text.to_string(),
                    model: request.model.clone(),
                    token_usage: TokenUsage::default(),
                    latency_ms: 1,
                }),
                Reply::Fail(msg) => Err(ProviderError::NetworkError(msg.to_string()).into()),
                Reply::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!()
                }
            }
        }

        fn available_models(&self) -> Vec<ModelInfo> {
            vec![]
        }
    }

    fn question() -> Question {
        Question {
            id: "sumif".into(),
            question: "How does SUMIF work?".into(),
            expected_answer_description: "Sums cells matching a condition.".into(),
            evaluation_criteria: "Mentions range, criteria, sum_range.".into(),
        }
    }

    fn evaluator(provider: Arc<StubProvider>) -> Evaluator {
        Evaluator::new(provider, EvaluatorConfig::default())
    }

    #[tokio::test]
    async fn blank_answers_skip_the_provider() {
        let provider = StubProvider::new(Reply::Text(r#"{"score": 5}"#));
        let ev = evaluator(provider.clone());

        for answer in ["", "   ", "\n\t "] {
            let result = ev.evaluate(&question(), answer).await;
            assert_eq!(result.score, 0.0);
            assert_eq!(result.rationale, NO_ANSWER_RATIONALE);
        }
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn well_formed_verdict() {
        let provider =
            StubProvider::new(Reply::Text(r#"{"score": 4, "rationale": "Good use of formulas"}"#));
        let result = evaluator(provider.clone())
            .evaluate(&question(), "It sums by condition")
            .await;
        assert_eq!(result, Evaluation::new(4.0, "Good use of formulas"));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn verdict_wrapped_in_prose() {
        let provider = StubProvider::new(Reply::Text(
            "Sure, here is the result:\n{\"score\": 3, \"rationale\": \"ok\"}\nThanks",
        ));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result, Evaluation::new(3.0, "ok"));
    }

    #[tokio::test]
    async fn non_numeric_score_becomes_zero() {
        let provider = StubProvider::new(Reply::Text(r#"{"score": "n/a", "rationale": "x"}"#));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result, Evaluation::new(0.0, "x"));
    }

    #[tokio::test]
    async fn score_is_rounded_and_clamped() {
        let provider = StubProvider::new(Reply::Text(r#"{"score": 3.46}"#));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result.score, 3.5);
        assert_eq!(result.rationale, "");

        let provider = StubProvider::new(Reply::Text(r#"{"score": 11, "rationale": "wow"}"#));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result.score, 5.0);
    }

    #[tokio::test]
    async fn provider_failure_becomes_sentinel() {
        let provider = StubProvider::new(Reply::Fail("connection reset"));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result.score, 0.0);
        assert!(result.rationale.starts_with(EVALUATION_FAILED_PREFIX));
        assert!(result.rationale.contains("connection reset"));
    }

    #[tokio::test]
    async fn unparseable_reply_becomes_sentinel() {
        let provider = StubProvider::new(Reply::Text("I'd give it a four."));
        let result = evaluator(provider).evaluate(&question(), "answer").await;
        assert_eq!(result.score, 0.0);
        assert!(result.rationale.contains("valid JSON"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_sentinel() {
        let provider = StubProvider::new(Reply::Hang);
        let config = EvaluatorConfig {
            timeout: Duration::from_secs(2),
            ..Default::default()
        };
        let result = Evaluator::new(provider, config)
            .evaluate(&question(), "answer")
            .await;
        assert_eq!(result.score, 0.0);
        assert!(result.rationale.contains("timed out after 2s"));
    }

    #[test]
    fn prompt_embeds_all_fields() {
        let prompt = build_prompt("Excel", &question(), "my answer");
        assert!(prompt.contains("expert Excel interviewer"));
        assert!(prompt.contains("Question: How does SUMIF work?"));
        assert!(prompt.contains("Answer: my answer"));
        assert!(prompt.contains("Sums cells matching a condition."));
        assert!(prompt.contains("Mentions range, criteria, sum_range."));
        assert!(prompt.contains("\"score\": number (0-5)"));
    }
}
