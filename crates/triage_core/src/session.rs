//! Triage session - the state machine driving one conversation.
//!
//! Each user event is handled fully before the next is accepted: strict
//! turn-taking, no overlapping capability calls. The session owns its
//! [`CaseRecord`] and mutates it only from the handler for the current
//! state; a front end serving concurrent connections must serialize access
//! per session.
//!
//! Transition table (state -> trigger -> next):
//!
//! | Intake          | text            | Refine (LOW) or DiagnoseConfirm (GOOD fast-path) |
//! | Refine          | answer          | Refine (more questions) or SummaryConfirm        |
//! | SummaryConfirm  | yes / no / ?    | DiagnoseConfirm / Intake (restart) / unchanged   |
//! | DiagnoseConfirm | causes (non-[]) | ResolutionCheck                                  |
//! | ResolutionCheck | yes / no / ?    | Closed(Resolved) / CaseForm / unchanged          |
//! | CaseForm        | form            | Closed(Escalated) or unchanged on validation err |
//! | Closed          | anything        | unchanged; only Reset re-enters Intake           |

use crate::case_form::{build_submission, CaseForm};
use crate::catalog::CauseCatalog;
use crate::evaluator::{CapabilityNotice, StatementEvaluator, StatementQuality};
use crate::llm_client::LlmClient;
use crate::matcher::{action_bundle, match_statement};
use crate::record::{CaseOutcome, CaseRecord, TriageState};
use crate::summarizer::Summarizer;
use crate::transcript::Speaker;
use std::sync::Arc;

/// Replies accepted as "yes" at the confirmation gates.
const YES_REPLIES: &[&str] = &["yes", "yep", "correct", "yes it is", "yes, correct"];
/// Replies accepted as "no".
const NO_REPLIES: &[&str] = &["no", "nope", "incorrect", "no it's not", "no, incorrect"];

/// Events a front end can feed into the machine.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// Free chat text (intake, refinement answers, yes/no replies).
    Message(String),
    /// Confirmed/adjusted cause selection from the diagnosis step.
    ConfirmCauses(Vec<String>),
    /// Escalation form submission.
    SubmitCase(CaseForm),
    /// Full restart: replaces the record with a fresh one.
    Reset,
}

/// One triage conversation: record plus collaborators.
pub struct TriageSession {
    record: CaseRecord,
    evaluator: StatementEvaluator,
    summarizer: Summarizer,
    catalog: CauseCatalog,
}

impl TriageSession {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self::with_catalog(client, CauseCatalog::builtin())
    }

    pub fn with_catalog(client: Arc<dyn LlmClient>, catalog: CauseCatalog) -> Self {
        Self {
            record: CaseRecord::new(),
            evaluator: StatementEvaluator::new(client.clone()),
            summarizer: Summarizer::new(client),
            catalog,
        }
    }

    pub fn record(&self) -> &CaseRecord {
        &self.record
    }

    pub fn state(&self) -> TriageState {
        self.record.state
    }

    pub fn catalog(&self) -> &CauseCatalog {
        &self.catalog
    }

    /// Handle one user event, running the full turn (capability calls
    /// included) before returning.
    pub fn handle(&mut self, event: UserEvent) {
        if let UserEvent::Reset = event {
            tracing::debug!("session reset");
            self.record = CaseRecord::new();
            return;
        }

        if self.record.state.is_terminal() {
            self.say("The case has been finalized. Please start a new chat if you have another issue.");
            return;
        }

        match (self.record.state, event) {
            (TriageState::Intake, UserEvent::Message(text)) => self.handle_intake(text),
            (TriageState::Refine, UserEvent::Message(text)) => self.handle_refinement(text),
            (TriageState::SummaryConfirm, UserEvent::Message(text)) => self.handle_summary_confirm(text),
            (TriageState::DiagnoseConfirm, UserEvent::ConfirmCauses(causes)) => {
                self.handle_diagnosis_confirm(causes)
            }
            (TriageState::ResolutionCheck, UserEvent::Message(text)) => self.handle_resolution_check(text),
            (TriageState::CaseForm, UserEvent::SubmitCase(form)) => self.handle_case_submission(form),
            (TriageState::DiagnoseConfirm, UserEvent::Message(text)) => {
                self.record.transcript.push(Speaker::User, text);
                self.say("Please confirm or adjust the cause selection to continue.");
            }
            (TriageState::CaseForm, UserEvent::Message(text)) => {
                self.record.transcript.push(Speaker::User, text);
                self.say("Please submit the case form to continue.");
            }
            (state, event) => {
                tracing::debug!("ignoring out-of-state event {:?} in {:?}", event, state);
            }
        }
    }

    // --- State handlers ---

    /// Intake: score the initial statement; either start the refinement loop
    /// or fast-path straight to diagnosis confirmation.
    fn handle_intake(&mut self, text: String) {
        self.record.transcript.push(Speaker::User, text.clone());
        self.record.initial_statement = text.clone();
        self.record.working_statement = text.clone();

        let (evaluation, notice) = self.evaluator.evaluate(&text);
        self.surface(notice);

        if evaluation.effective_quality() == StatementQuality::Low {
            let mut batch: std::collections::VecDeque<String> = evaluation.questions.into();
            // First question of a fresh batch is asked immediately.
            if let Some(first_q) = batch.pop_front() {
                self.record.pending_questions = batch;
                self.say(format!(
                    "Thank you for the initial statement. To provide better support, I need a \
                     little more detail. Let's start with a quick question to narrow things \
                     down:\n\n{}",
                    first_q
                ));
                self.record.state = TriageState::Refine;
                return;
            }
        }

        self.seed_diagnosis(&text);
        let cause = self.record.suggested_cause.clone();
        self.say(format!(
            "Your initial problem statement is very clear! Based on this, I have identified \
             the most probable cause as {}. Please review and adjust the selected causes \
             below, then confirm the diagnosis.",
            cause
        ));
        self.record.state = TriageState::DiagnoseConfirm;
    }

    /// Refine: record the answer, ask the next pending question, or re-score
    /// the full statement once the batch is drained.
    fn handle_refinement(&mut self, answer: String) {
        self.record.transcript.push(Speaker::User, answer.clone());
        self.record.refinement_answers.push(answer);

        if let Some(next_q) = self.record.pending_questions.pop_front() {
            let transition = if self.record.refinement_answers.len() == 1 {
                "Thanks for the information. And next, can you tell me:"
            } else {
                "I'm still trying to narrow this down. What about this:"
            };
            self.say(format!("{}\n\n{}", transition, next_q));
            return;
        }

        // Batch drained: re-score the combined statement.
        let structured = self.record.structured_statement();
        self.record.working_statement = structured.clone();

        let (evaluation, notice) = self.evaluator.evaluate(&structured);
        self.surface(notice);

        if evaluation.effective_quality() == StatementQuality::Low {
            let mut batch: std::collections::VecDeque<String> = evaluation.questions.into();
            if let Some(next_q) = batch.pop_front() {
                self.record.pending_questions = batch;
                self.say(format!(
                    "I appreciate the extra detail, but the overall picture still needs \
                     clarification. Let's try this critical question:\n\n{}",
                    next_q
                ));
                return;
            }
        }

        let (summary, notice) = self.summarizer.summarize(&structured);
        self.surface(notice);
        self.record.working_statement = summary.clone();
        self.record.statement_confirmed = false;
        self.say(format!(
            "Excellent! I've combined all the details. Before we move to the diagnostic \
             phase, could you please confirm I have accurately summarized your issue?\n\n\
             My Understanding (Summary):\n\n{}\n\n\
             Is this statement correct? (Please answer 'Yes' or 'No')",
            summary
        ));
        self.record.state = TriageState::SummaryConfirm;
    }

    /// SummaryConfirm: yes runs the matcher and moves on; no restarts the
    /// intake pass; anything else re-prompts.
    fn handle_summary_confirm(&mut self, reply: String) {
        self.record.transcript.push(Speaker::User, reply.clone());

        if is_yes(&reply) {
            self.record.statement_confirmed = true;
            let statement = self.record.working_statement.clone();
            self.seed_diagnosis(&statement);
            let cause = self.record.suggested_cause.clone();
            self.say(format!(
                "Great, confirmed! Based on your detailed statement, I have identified the most \
                 probable cause as {}. Please review and adjust the selected causes below, then \
                 confirm the diagnosis.",
                cause
            ));
            self.record.state = TriageState::DiagnoseConfirm;
        } else if is_no(&reply) {
            self.record.statement_confirmed = false;
            self.record.clear_refinement();
            self.say(
                "Apologies for the misunderstanding. Please provide a new, complete and accurate \
                 summary of your issue, incorporating any details I missed. This will restart \
                 the scoring process.",
            );
            // History stays intact; the next message starts a new intake pass.
            self.record.state = TriageState::Intake;
        } else {
            self.say("Please confirm by simply typing 'Yes' or 'No'.");
        }
    }

    /// DiagnoseConfirm: non-empty selection required; rewrites the working
    /// statement with the confirmed causes and aggregates their actions.
    fn handle_diagnosis_confirm(&mut self, causes: Vec<String>) {
        let causes = dedup_preserving_order(causes);
        if causes.is_empty() {
            self.say("Please select at least one probable cause before confirming the diagnosis.");
            return;
        }

        self.record.selected_causes = causes.clone();
        self.record.suggested_cause = causes[0].clone();

        let original = self.record.working_statement.clone();
        let (summary, notice) = self.summarizer.summarize_with_causes(&original, &causes);
        self.surface(notice);
        self.record.working_statement = summary;

        self.record.suggested_action = action_bundle(&self.catalog, &causes);
        let primary = self.record.suggested_cause.clone();
        let bundle = self.record.suggested_action.clone();
        self.say(format!(
            "Diagnosis Confirmed! Your primary issue is focused on {}.\n\n\
             Suggested Action:\n\n{}\n\n\
             Please try the suggested action. Were you able to resolve the issue? \
             (Please answer 'Yes' or 'No')",
            primary, bundle
        ));
        self.record.state = TriageState::ResolutionCheck;
    }

    /// ResolutionCheck: resolved closes the session; not resolved escalates
    /// to the case form.
    fn handle_resolution_check(&mut self, reply: String) {
        self.record.transcript.push(Speaker::User, reply.clone());

        if is_yes(&reply) {
            self.say(
                "Glad to hear the issue is resolved! I'll close this session now. \
                 Start a new chat if anything else comes up.",
            );
            self.record.outcome = Some(CaseOutcome::Resolved);
            self.record.state = TriageState::Closed;
        } else if is_no(&reply) {
            self.say(
                "Understood. If the issue persists, we need to create a formal case for our \
                 support team. Please fill out the case form with your contact details.",
            );
            self.record.state = TriageState::CaseForm;
        } else {
            self.say("Please answer 'Yes' or 'No': were you able to resolve the issue?");
        }
    }

    /// CaseForm: validation failures re-prompt in place; success assigns the
    /// case id and closes the session as escalated.
    fn handle_case_submission(&mut self, form: CaseForm) {
        match build_submission(&form, &self.record) {
            Err(missing) => {
                self.say(format!(
                    "Please fill in all required fields to submit the case. Missing: {}",
                    missing.join(", ")
                ));
            }
            Ok(submission) => {
                self.record.case_id = Some(submission.case_id.clone());
                self.say(format!(
                    "Case Successfully Created!\n\n\
                     - Case ID: {}\n\
                     - Contact: {} ({})\n\
                     - Issue: {}\n\
                     - Bot Diagnosis: {}\n\n\
                     Your case has been submitted to a human agent who will review the suggested \
                     action and contact you shortly.",
                    submission.case_id,
                    submission.full_name,
                    submission.email,
                    submission.problem_statement,
                    submission.suggested_cause
                ));
                self.record.outcome = Some(CaseOutcome::Escalated);
                self.record.state = TriageState::Closed;
            }
        }
    }

    // --- Helpers ---

    /// Run the matcher on a statement and seed the selection with the result.
    fn seed_diagnosis(&mut self, statement: &str) {
        let outcome = match_statement(&self.catalog, statement);
        self.record.suggested_action = outcome.action;
        self.record.suggested_cause = outcome.cause.clone();
        self.record.selected_causes = vec![outcome.cause];
    }

    fn say(&mut self, text: impl Into<String>) {
        self.record.transcript.push(Speaker::Assistant, text);
    }

    /// Surface a capability notice as an informational transcript note.
    fn surface(&mut self, notice: Option<CapabilityNotice>) {
        if let Some(notice) = notice {
            let note = notice.transcript_note();
            self.say(note);
        }
    }
}

fn normalize_reply(reply: &str) -> String {
    reply.trim().to_lowercase()
}

fn is_yes(reply: &str) -> bool {
    YES_REPLIES.contains(&normalize_reply(reply).as_str())
}

fn is_no(reply: &str) -> bool {
    NO_REPLIES.contains(&normalize_reply(reply).as_str())
}

fn dedup_preserving_order(causes: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(causes.len());
    for cause in causes {
        if !out.contains(&cause) {
            out.push(cause);
        }
    }
    out
}
