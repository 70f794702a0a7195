//! Summarizer - condenses accumulated statement fragments into prose.
//!
//! Same fail-open discipline as the evaluator: if the capability is down or
//! returns nothing usable, a deterministic textual splice stands in, so the
//! pipeline always has SOME working statement to carry forward.

use crate::evaluator::CapabilityNotice;
use crate::llm_client::LlmClient;
use crate::prompts::{CASE_SUMMARY_SYSTEM_PROMPT, SUMMARY_SYSTEM_PROMPT};
use std::sync::Arc;

/// Field labels used when building the structured statement; the fallback
/// splice strips them back out.
pub const INITIAL_PROBLEM_LABEL: &str = "Initial Problem:";
pub const ADDITIONAL_DETAILS_LABEL: &str = "Additional Details:";

/// Adapter around the text-generation capability.
pub struct Summarizer {
    client: Arc<dyn LlmClient>,
}

impl Summarizer {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    /// Condense a structured statement into a human-readable summary.
    pub fn summarize(&self, structured: &str) -> (String, Option<CapabilityNotice>) {
        match self.client.call_text(SUMMARY_SYSTEM_PROMPT, structured) {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!("summary generation failed, using deterministic splice: {}", e);
                (
                    splice_fallback(structured),
                    Some(CapabilityNotice::new("summary generation", e.to_string())),
                )
            }
        }
    }

    /// Rewrite the statement to also name the confirmed causes, for the
    /// final case record.
    pub fn summarize_with_causes(
        &self,
        original: &str,
        causes: &[String],
    ) -> (String, Option<CapabilityNotice>) {
        let user_prompt = format!(
            "Problem statement: {}\nConfirmed probable causes: {}",
            original,
            causes.join(", ")
        );

        match self.client.call_text(CASE_SUMMARY_SYSTEM_PROMPT, &user_prompt) {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::warn!("case summary failed, using deterministic concatenation: {}", e);
                (
                    causes_fallback(original, causes),
                    Some(CapabilityNotice::new("summary generation", e.to_string())),
                )
            }
        }
    }
}

/// Deterministic fallback: strip field labels and join the fragments.
fn splice_fallback(structured: &str) -> String {
    let spliced = structured
        .replace(INITIAL_PROBLEM_LABEL, "")
        .replace(ADDITIONAL_DETAILS_LABEL, " - ")
        .replace('\n', " ");
    let spliced = spliced.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("SUMMARY: {}", spliced.trim())
}

/// Deterministic fallback: original text plus the joined cause list.
fn causes_fallback(original: &str, causes: &[String]) -> String {
    if causes.is_empty() {
        return original.trim().to_string();
    }
    format!("{} Confirmed probable causes: {}.", original.trim(), causes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{FakeLlmClient, LlmError};

    #[test]
    fn test_summarize_uses_capability_output() {
        let client = FakeLlmClient::always(serde_json::json!({}), "The printer jams daily.");
        let summarizer = Summarizer::new(Arc::new(client));
        let (summary, notice) = summarizer.summarize("Initial Problem: jam\nAdditional Details: daily");
        assert_eq!(summary, "The printer jams daily.");
        assert!(notice.is_none());
    }

    #[test]
    fn test_splice_fallback_strips_labels() {
        let client = FakeLlmClient::always_error(LlmError::Disabled);
        let summarizer = Summarizer::new(Arc::new(client));
        let (summary, notice) =
            summarizer.summarize("Initial Problem: printer jams\nAdditional Details: daily, since Monday");
        assert_eq!(summary, "SUMMARY: printer jams - daily, since Monday");
        assert!(notice.is_some());
    }

    #[test]
    fn test_causes_fallback_concatenates() {
        let client = FakeLlmClient::always_error(LlmError::Timeout(30));
        let summarizer = Summarizer::new(Arc::new(client));
        let causes = vec!["Clogged Print Head (Inkjet)".to_string()];
        let (summary, notice) = summarizer.summarize_with_causes("Printer prints streaks.", &causes);
        assert!(summary.starts_with("Printer prints streaks."));
        assert!(summary.contains("Clogged Print Head (Inkjet)"));
        assert!(notice.is_some());
    }

    #[test]
    fn test_empty_capability_output_falls_back() {
        // call_text validates non-empty output at the client layer; an empty
        // scripted queue behaves the same way here.
        let client = FakeLlmClient::new(vec![], vec![]);
        let summarizer = Summarizer::new(Arc::new(client));
        let (summary, notice) = summarizer.summarize("Initial Problem: x");
        assert!(summary.starts_with("SUMMARY:"));
        assert!(notice.is_some());
    }
}
