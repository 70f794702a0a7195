//! Statement evaluator - decides whether a problem statement is good enough.
//!
//! Delegates the judgment to the LLM capability with a fixed rubric (device,
//! symptom, onset timing) and validates the response strictly. On any
//! failure - capability disabled, transport error, malformed response - the
//! adapter fails OPEN: it returns `(Good, [])` and a [`CapabilityNotice`] so
//! the session keeps moving.

use crate::llm_client::LlmClient;
use crate::prompts::{SCORING_SCHEMA, SCORING_SYSTEM_PROMPT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Quality verdict for a problem statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementQuality {
    Good,
    Low,
}

impl StatementQuality {
    /// Parse the capability's label. Anything else is malformed.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "GOOD" => Some(StatementQuality::Good),
            "LOW" => Some(StatementQuality::Low),
            _ => None,
        }
    }
}

/// Evaluation result: verdict plus clarifying questions (only when Low).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub quality: StatementQuality,
    pub questions: Vec<String>,
}

impl Evaluation {
    /// Fail-open default: trust the user rather than block progress.
    pub fn good() -> Self {
        Self {
            quality: StatementQuality::Good,
            questions: Vec::new(),
        }
    }

    /// Policy: a Low verdict with no questions to ask is treated as Good.
    /// The quality gate is best-effort, never an infinite loop.
    pub fn effective_quality(&self) -> StatementQuality {
        if self.quality == StatementQuality::Low && self.questions.is_empty() {
            StatementQuality::Good
        } else {
            self.quality
        }
    }
}

/// Informational note about a capability failure, surfaced in the transcript
/// instead of aborting the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityNotice {
    pub capability: &'static str,
    pub detail: String,
}

impl CapabilityNotice {
    pub fn new(capability: &'static str, detail: impl Into<String>) -> Self {
        Self {
            capability,
            detail: detail.into(),
        }
    }

    /// Transcript wording for this notice.
    pub fn transcript_note(&self) -> String {
        format!(
            "(Note: {} is unavailable right now ({}). Proceeding with your description as-is.)",
            self.capability, self.detail
        )
    }
}

/// Wire shape of the scoring response.
#[derive(Debug, Deserialize)]
struct ScoringResponse {
    score_status: String,
    #[serde(default)]
    follow_up_questions: Vec<String>,
}

/// Adapter around the scoring capability.
pub struct StatementEvaluator {
    client: Arc<dyn LlmClient>,
}

impl StatementEvaluator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Evaluate a problem statement. Never fails: capability trouble comes
    /// back as a notice next to a Good verdict.
    pub fn evaluate(&self, statement: &str) -> (Evaluation, Option<CapabilityNotice>) {
        let user_prompt = format!("User's problem statement: '{}'", statement);

        let value = match self
            .client
            .call_json(SCORING_SYSTEM_PROMPT, &user_prompt, SCORING_SCHEMA)
        {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("statement scoring failed, assuming GOOD: {}", e);
                return (
                    Evaluation::good(),
                    Some(CapabilityNotice::new("statement scoring", e.to_string())),
                );
            }
        };

        match Self::validate(value) {
            Ok(evaluation) => (evaluation, None),
            Err(reason) => {
                tracing::warn!("malformed scoring response, assuming GOOD: {}", reason);
                (
                    Evaluation::good(),
                    Some(CapabilityNotice::new("statement scoring", reason)),
                )
            }
        }
    }

    /// Validate the capability output against the contract:
    /// a quality label plus questions only when the label is LOW.
    fn validate(value: serde_json::Value) -> Result<Evaluation, String> {
        let response: ScoringResponse =
            serde_json::from_value(value).map_err(|e| format!("schema mismatch: {}", e))?;

        let quality = StatementQuality::parse(&response.score_status)
            .ok_or_else(|| format!("unknown score_status '{}'", response.score_status))?;

        let questions: Vec<String> = response
            .follow_up_questions
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if quality == StatementQuality::Good && !questions.is_empty() {
            return Err("GOOD verdict carried follow-up questions".to_string());
        }

        Ok(Evaluation { quality, questions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{FakeLlmClient, LlmError};

    fn evaluator(client: FakeLlmClient) -> StatementEvaluator {
        StatementEvaluator::new(Arc::new(client))
    }

    #[test]
    fn test_good_verdict() {
        let client = FakeLlmClient::always(
            serde_json::json!({"score_status": "GOOD", "follow_up_questions": []}),
            "",
        );
        let (eval, notice) = evaluator(client).evaluate("My HP LaserJet 4001 jams daily since Monday");
        assert_eq!(eval.quality, StatementQuality::Good);
        assert!(eval.questions.is_empty());
        assert!(notice.is_none());
    }

    #[test]
    fn test_low_verdict_with_questions() {
        let client = FakeLlmClient::always(
            serde_json::json!({
                "score_status": "LOW",
                "follow_up_questions": ["Which device?", "When did it start?"]
            }),
            "",
        );
        let (eval, notice) = evaluator(client).evaluate("it's broken");
        assert_eq!(eval.quality, StatementQuality::Low);
        assert_eq!(eval.questions.len(), 2);
        assert!(notice.is_none());
    }

    #[test]
    fn test_unavailable_capability_fails_open() {
        let client = FakeLlmClient::always_error(LlmError::Disabled);
        let (eval, notice) = evaluator(client).evaluate("anything at all");
        assert_eq!(eval, Evaluation::good());
        assert!(notice.is_some());
    }

    #[test]
    fn test_malformed_label_fails_open() {
        let client = FakeLlmClient::always(
            serde_json::json!({"score_status": "MAYBE", "follow_up_questions": []}),
            "",
        );
        let (eval, notice) = evaluator(client).evaluate("text");
        assert_eq!(eval, Evaluation::good());
        assert!(notice.unwrap().detail.contains("MAYBE"));
    }

    #[test]
    fn test_good_with_questions_is_malformed() {
        let client = FakeLlmClient::always(
            serde_json::json!({"score_status": "GOOD", "follow_up_questions": ["Why?"]}),
            "",
        );
        let (eval, notice) = evaluator(client).evaluate("text");
        assert_eq!(eval, Evaluation::good());
        assert!(notice.is_some());
    }

    #[test]
    fn test_low_with_no_questions_is_effectively_good() {
        let eval = Evaluation {
            quality: StatementQuality::Low,
            questions: Vec::new(),
        };
        assert_eq!(eval.effective_quality(), StatementQuality::Good);
    }

    #[test]
    fn test_blank_questions_are_dropped() {
        let client = FakeLlmClient::always(
            serde_json::json!({"score_status": "LOW", "follow_up_questions": ["  ", "Real one?"]}),
            "",
        );
        let (eval, _) = evaluator(client).evaluate("text");
        assert_eq!(eval.questions, vec!["Real one?".to_string()]);
    }
}
