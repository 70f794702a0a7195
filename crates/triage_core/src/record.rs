//! Case record - the single mutable aggregate for one triage session.
//!
//! The state enum replaces the loose numeric step markers of earlier designs
//! (1, 1.5, 2, 2.5...) with a closed set of explicit states, including the
//! confirmation sub-states.

use crate::transcript::{Speaker, Transcript};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Greeting the assistant opens every session with.
pub const GREETING: &str = "Hello! I'm your Technical Support Bot. Please describe the \
hardware issue you are facing to begin the triage process.";

/// States of the triage machine. Transitions only happen through the
/// session handlers; see `session.rs` for the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageState {
    /// Waiting for the initial problem statement.
    Intake,
    /// Asking clarifying questions one at a time.
    Refine,
    /// Waiting for a yes/no on the summarized statement.
    SummaryConfirm,
    /// Waiting for the user to confirm/adjust the cause selection.
    DiagnoseConfirm,
    /// Asking whether the suggested action resolved the issue.
    ResolutionCheck,
    /// Collecting the escalation form.
    CaseForm,
    /// Terminal. Only a full reset re-enters Intake.
    Closed,
}

impl TriageState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TriageState::Closed)
    }

    /// Does this state accept free chat text (as opposed to a selection or
    /// form submission)?
    pub fn accepts_text(&self) -> bool {
        matches!(
            self,
            TriageState::Intake
                | TriageState::Refine
                | TriageState::SummaryConfirm
                | TriageState::ResolutionCheck
        )
    }

    pub fn description(&self) -> &'static str {
        match self {
            TriageState::Intake => "Describing the issue",
            TriageState::Refine => "Answering clarifying questions",
            TriageState::SummaryConfirm => "Confirming the summary",
            TriageState::DiagnoseConfirm => "Confirming the diagnosis",
            TriageState::ResolutionCheck => "Checking resolution",
            TriageState::CaseForm => "Creating a support case",
            TriageState::Closed => "Finished",
        }
    }
}

impl std::fmt::Display for TriageState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// How a closed session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseOutcome {
    /// The suggested action fixed it; no case was filed.
    Resolved,
    /// A support case was created for a human agent.
    Escalated,
}

/// Everything one triage session accumulates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    /// Append-only conversation log.
    pub transcript: Transcript,
    /// Current machine state.
    pub state: TriageState,
    /// Raw first-turn text. Set once per intake pass.
    pub initial_statement: String,
    /// Clarification answers, in the order given. Cleared on restart.
    pub refinement_answers: Vec<String>,
    /// Clarifying questions not yet asked. Non-empty only while refining.
    pub pending_questions: VecDeque<String>,
    /// Current best-known problem description.
    pub working_statement: String,
    /// True only after the user explicitly accepted a working statement.
    pub statement_confirmed: bool,
    /// Matcher/aggregator outputs. Recomputed, never merged.
    pub suggested_cause: String,
    pub suggested_action: String,
    /// Causes the user agreed apply. Ordered, semantically a set.
    pub selected_causes: Vec<String>,
    /// Assigned exactly once, at submission.
    pub case_id: Option<String>,
    /// Set when the session closes.
    pub outcome: Option<CaseOutcome>,
}

impl Default for CaseRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseRecord {
    /// Fresh record with the greeting already in the transcript.
    pub fn new() -> Self {
        let mut transcript = Transcript::new();
        transcript.push(Speaker::Assistant, GREETING);
        Self {
            transcript,
            state: TriageState::Intake,
            initial_statement: String::new(),
            refinement_answers: Vec::new(),
            pending_questions: VecDeque::new(),
            working_statement: String::new(),
            statement_confirmed: false,
            suggested_cause: String::new(),
            suggested_action: String::new(),
            selected_causes: Vec::new(),
            case_id: None,
            outcome: None,
        }
    }

    /// Structured statement combining the initial text and all refinement
    /// answers. Input to re-scoring and to the summarizer.
    pub fn structured_statement(&self) -> String {
        format!(
            "{} {}\n{} {}",
            crate::summarizer::INITIAL_PROBLEM_LABEL,
            self.initial_statement,
            crate::summarizer::ADDITIONAL_DETAILS_LABEL,
            self.refinement_answers.join(", ")
        )
    }

    /// Clear the refinement loop state (restart after a rejected summary).
    pub fn clear_refinement(&mut self) {
        self.refinement_answers.clear();
        self.pending_questions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_greets() {
        let record = CaseRecord::new();
        assert_eq!(record.state, TriageState::Intake);
        assert_eq!(record.transcript.len(), 1);
        assert!(record.transcript.contains("Technical Support Bot"));
        assert!(record.case_id.is_none());
    }

    #[test]
    fn test_structured_statement_layout() {
        let mut record = CaseRecord::new();
        record.initial_statement = "printer broken".to_string();
        record.refinement_answers = vec!["HP LaserJet".to_string(), "since Monday".to_string()];
        let structured = record.structured_statement();
        assert!(structured.contains("Initial Problem: printer broken"));
        assert!(structured.contains("Additional Details: HP LaserJet, since Monday"));
    }

    #[test]
    fn test_state_text_acceptance() {
        assert!(TriageState::Intake.accepts_text());
        assert!(TriageState::SummaryConfirm.accepts_text());
        assert!(!TriageState::DiagnoseConfirm.accepts_text());
        assert!(!TriageState::CaseForm.accepts_text());
        assert!(TriageState::Closed.is_terminal());
    }
}
