//! End-to-end session flows with a scripted fake LLM client.

use std::sync::Arc;

use triage_core::catalog::POWER_SUPPLY_CAUSE;
use triage_core::{
    CaseForm, CaseOutcome, FakeLlmClient, LlmError, TriageSession, TriageState, UserEvent,
};

fn good_json() -> serde_json::Value {
    serde_json::json!({"score_status": "GOOD", "follow_up_questions": []})
}

fn low_json(questions: &[&str]) -> serde_json::Value {
    serde_json::json!({"score_status": "LOW", "follow_up_questions": questions})
}

fn session_with(
    json: Vec<Result<serde_json::Value, LlmError>>,
    text: Vec<Result<String, LlmError>>,
) -> TriageSession {
    TriageSession::new(Arc::new(FakeLlmClient::new(json, text)))
}

fn valid_form() -> CaseForm {
    CaseForm {
        full_name: "Jo Doe".to_string(),
        email: "jo@example.com".to_string(),
        phone: "555-0100".to_string(),
        product_model: "HP LaserJet 4001".to_string(),
    }
}

#[test]
fn scenario_a_clear_power_statement_fast_paths_to_diagnosis() {
    let mut session = session_with(vec![Ok(good_json())], vec![]);

    session.handle(UserEvent::Message("My printer won't turn on".to_string()));

    assert_eq!(session.state(), TriageState::DiagnoseConfirm);
    let record = session.record();
    assert_eq!(record.suggested_cause, POWER_SUPPLY_CAUSE);
    assert_eq!(record.selected_causes, vec![POWER_SUPPLY_CAUSE.to_string()]);
    assert_eq!(record.working_statement, "My printer won't turn on");
    assert!(record.pending_questions.is_empty());
}

#[test]
fn scenario_b_vague_statement_starts_refinement() {
    let mut session = session_with(
        vec![Ok(low_json(&["Which device is it?", "When did it start?"]))],
        vec![],
    );

    session.handle(UserEvent::Message("it's broken".to_string()));

    assert_eq!(session.state(), TriageState::Refine);
    let record = session.record();
    // First question asked immediately, one left in the queue.
    assert_eq!(record.pending_questions.len(), 1);
    assert!(record.transcript.contains("Which device is it?"));
    assert!(!record.transcript.contains("When did it start?"));
}

#[test]
fn scenario_c_full_round_trip_to_escalated_case() {
    let mut session = session_with(
        vec![
            Ok(low_json(&["Which device is it?", "When did it start?"])),
            Ok(good_json()),
        ],
        vec![
            Ok("The HP printer has no power since Monday.".to_string()),
            Ok("HP printer without power since Monday; probable PSU failure.".to_string()),
        ],
    );

    session.handle(UserEvent::Message("it's broken".to_string()));
    assert_eq!(session.state(), TriageState::Refine);

    session.handle(UserEvent::Message("An HP printer, it has no power".to_string()));
    assert_eq!(session.state(), TriageState::Refine);
    assert!(session.record().transcript.contains("When did it start?"));

    session.handle(UserEvent::Message("Since Monday".to_string()));
    assert_eq!(session.state(), TriageState::SummaryConfirm);
    assert_eq!(
        session.record().working_statement,
        "The HP printer has no power since Monday."
    );
    assert!(!session.record().statement_confirmed);

    session.handle(UserEvent::Message("yes".to_string()));
    assert_eq!(session.state(), TriageState::DiagnoseConfirm);
    assert!(session.record().statement_confirmed);
    // The confirmed summary carries a power keyword: critical override.
    assert_eq!(session.record().suggested_cause, POWER_SUPPLY_CAUSE);

    session.handle(UserEvent::ConfirmCauses(vec![POWER_SUPPLY_CAUSE.to_string()]));
    assert_eq!(session.state(), TriageState::ResolutionCheck);
    assert!(session.record().working_statement.contains("probable PSU failure"));
    assert!(session.record().suggested_action.contains("power cable"));

    session.handle(UserEvent::Message("no".to_string()));
    assert_eq!(session.state(), TriageState::CaseForm);

    session.handle(UserEvent::SubmitCase(valid_form()));
    let record = session.record();
    assert_eq!(record.state, TriageState::Closed);
    assert_eq!(record.outcome, Some(CaseOutcome::Escalated));
    let case_id = record.case_id.as_deref().expect("case id assigned");
    assert!(case_id.starts_with("TKT-"));
    assert!(record.transcript.contains("Case Successfully Created"));
}

#[test]
fn refinement_never_reasks_a_popped_question() {
    let mut session = session_with(
        vec![
            Ok(low_json(&["Q-one?", "Q-two?"])),
            Ok(good_json()),
        ],
        vec![Ok("Summary.".to_string())],
    );

    session.handle(UserEvent::Message("vague".to_string()));
    session.handle(UserEvent::Message("answer one".to_string()));
    session.handle(UserEvent::Message("answer two".to_string()));

    let transcript = session.record().transcript.entries();
    let q_one_count = transcript.iter().filter(|e| e.text.contains("Q-one?")).count();
    let q_two_count = transcript.iter().filter(|e| e.text.contains("Q-two?")).count();
    assert_eq!(q_one_count, 1);
    assert_eq!(q_two_count, 1);
}

#[test]
fn still_low_refills_the_question_queue() {
    let mut session = session_with(
        vec![
            Ok(low_json(&["First question?"])),
            Ok(low_json(&["Second batch question?", "Third question?"])),
        ],
        vec![],
    );

    session.handle(UserEvent::Message("vague".to_string()));
    assert_eq!(session.state(), TriageState::Refine);

    // Only question answered: batch drained, re-score comes back LOW again.
    session.handle(UserEvent::Message("an answer".to_string()));
    assert_eq!(session.state(), TriageState::Refine);
    assert!(session.record().transcript.contains("Second batch question?"));
    assert_eq!(session.record().pending_questions.len(), 1);
}

#[test]
fn low_without_questions_proceeds_to_summary() {
    // Policy: LOW with an empty question list is treated as GOOD.
    let mut session = session_with(
        vec![Ok(low_json(&["Only question?"])), Ok(low_json(&[]))],
        vec![Ok("Spliced summary.".to_string())],
    );

    session.handle(UserEvent::Message("vague".to_string()));
    session.handle(UserEvent::Message("an answer".to_string()));

    assert_eq!(session.state(), TriageState::SummaryConfirm);
    assert_eq!(session.record().working_statement, "Spliced summary.");
}

#[test]
fn evaluator_outage_fails_open_and_leaves_a_note() {
    let mut session = session_with(
        vec![Err(LlmError::HttpError("connection refused".to_string()))],
        vec![],
    );

    session.handle(UserEvent::Message("printer scans blank pages".to_string()));

    // Fail-open: treated as GOOD, diagnosis seeded, note in transcript.
    assert_eq!(session.state(), TriageState::DiagnoseConfirm);
    assert!(session.record().transcript.contains("statement scoring is unavailable"));
    assert!(!session.record().selected_causes.is_empty());
}

#[test]
fn unrecognized_summary_reply_reprompts_without_transition() {
    let mut session = session_with(
        vec![Ok(low_json(&["Q?"])), Ok(good_json())],
        vec![Ok("Summary.".to_string())],
    );
    session.handle(UserEvent::Message("vague".to_string()));
    session.handle(UserEvent::Message("answer".to_string()));
    assert_eq!(session.state(), TriageState::SummaryConfirm);

    session.handle(UserEvent::Message("perhaps".to_string()));
    assert_eq!(session.state(), TriageState::SummaryConfirm);
    assert!(session.record().transcript.contains("simply typing 'Yes' or 'No'"));
}

#[test]
fn rejected_summary_restarts_intake_with_history_intact() {
    let mut session = session_with(
        vec![Ok(low_json(&["Q?"])), Ok(good_json()), Ok(good_json())],
        vec![Ok("Wrong summary.".to_string())],
    );
    session.handle(UserEvent::Message("vague".to_string()));
    session.handle(UserEvent::Message("answer".to_string()));
    let transcript_len_before = session.record().transcript.len();

    session.handle(UserEvent::Message("no".to_string()));
    assert_eq!(session.state(), TriageState::Intake);
    let record = session.record();
    assert!(record.refinement_answers.is_empty());
    assert!(record.pending_questions.is_empty());
    assert!(!record.statement_confirmed);
    // History intact, not reset.
    assert!(record.transcript.len() > transcript_len_before);

    // The replacement statement starts a new intake pass.
    session.handle(UserEvent::Message(
        "My Epson printer prints streaks since the toner change".to_string(),
    ));
    assert_eq!(session.state(), TriageState::DiagnoseConfirm);
    assert_eq!(
        session.record().initial_statement,
        "My Epson printer prints streaks since the toner change"
    );
}

#[test]
fn empty_cause_selection_is_rejected() {
    let mut session = session_with(vec![Ok(good_json())], vec![]);
    session.handle(UserEvent::Message("printer won't turn on".to_string()));
    assert_eq!(session.state(), TriageState::DiagnoseConfirm);

    session.handle(UserEvent::ConfirmCauses(vec![]));
    assert_eq!(session.state(), TriageState::DiagnoseConfirm);
    assert!(session.record().transcript.contains("select at least one"));
}

#[test]
fn duplicate_causes_are_collapsed() {
    let mut session = session_with(
        vec![Ok(good_json())],
        vec![Ok("Case summary.".to_string())],
    );
    session.handle(UserEvent::Message("printer won't turn on".to_string()));

    session.handle(UserEvent::ConfirmCauses(vec![
        POWER_SUPPLY_CAUSE.to_string(),
        POWER_SUPPLY_CAUSE.to_string(),
    ]));
    assert_eq!(session.record().selected_causes, vec![POWER_SUPPLY_CAUSE.to_string()]);
    assert_eq!(session.state(), TriageState::ResolutionCheck);
}

#[test]
fn resolved_issue_closes_without_a_case() {
    let mut session = session_with(
        vec![Ok(good_json())],
        vec![Ok("Case summary.".to_string())],
    );
    session.handle(UserEvent::Message("printer won't turn on".to_string()));
    session.handle(UserEvent::ConfirmCauses(vec![POWER_SUPPLY_CAUSE.to_string()]));
    assert_eq!(session.state(), TriageState::ResolutionCheck);

    session.handle(UserEvent::Message("yes".to_string()));
    let record = session.record();
    assert_eq!(record.state, TriageState::Closed);
    assert_eq!(record.outcome, Some(CaseOutcome::Resolved));
    assert!(record.case_id.is_none());
}

#[test]
fn invalid_form_reports_missing_fields_and_stays_put() {
    let mut session = session_with(
        vec![Ok(good_json())],
        vec![Ok("Case summary.".to_string())],
    );
    session.handle(UserEvent::Message("printer won't turn on".to_string()));
    session.handle(UserEvent::ConfirmCauses(vec![POWER_SUPPLY_CAUSE.to_string()]));
    session.handle(UserEvent::Message("no".to_string()));
    assert_eq!(session.state(), TriageState::CaseForm);

    let mut form = valid_form();
    form.full_name = "   ".to_string();
    session.handle(UserEvent::SubmitCase(form));

    assert_eq!(session.state(), TriageState::CaseForm);
    assert!(session.record().case_id.is_none());
    assert!(session.record().transcript.contains("Missing: Full Name"));
}

#[test]
fn closed_session_ignores_input_until_reset() {
    let mut session = session_with(
        vec![Ok(good_json())],
        vec![Ok("Case summary.".to_string())],
    );
    session.handle(UserEvent::Message("printer won't turn on".to_string()));
    session.handle(UserEvent::ConfirmCauses(vec![POWER_SUPPLY_CAUSE.to_string()]));
    session.handle(UserEvent::Message("yes".to_string()));
    assert_eq!(session.state(), TriageState::Closed);

    session.handle(UserEvent::Message("hello again".to_string()));
    assert_eq!(session.state(), TriageState::Closed);
    assert!(session.record().transcript.contains("has been finalized"));

    session.handle(UserEvent::Reset);
    assert_eq!(session.state(), TriageState::Intake);
    assert_eq!(session.record().transcript.len(), 1);
}
