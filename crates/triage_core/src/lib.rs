//! Triage Core - Conversational hardware-support triage engine
//!
//! Takes a user from a vague hardware complaint to a scored, diagnosed and
//! optionally escalated support case. The state machine lives in [`session`];
//! everything else is either domain knowledge ([`catalog`], [`matcher`]) or
//! an adapter around the LLM capability ([`evaluator`], [`summarizer`]).
//!
//! No rendering code lives here. Front ends consume the transcript and the
//! current state, and feed [`session::UserEvent`] values back in.

pub mod case_form;
pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod llm_client;
pub mod matcher;
pub mod prompts;
pub mod record;
pub mod session;
pub mod summarizer;
pub mod transcript;

pub use case_form::{generate_case_id, CaseForm, CaseSubmission, CASE_ID_PREFIX};
pub use catalog::{CauseCatalog, CauseRecord};
pub use config::TriageConfig;
pub use error::TriageError;
pub use evaluator::{CapabilityNotice, Evaluation, StatementEvaluator, StatementQuality};
pub use llm_client::{FakeLlmClient, HttpLlmClient, LlmClient, LlmConfig, LlmError};
pub use matcher::{action_bundle, match_statement, MatchOutcome};
pub use record::{CaseOutcome, CaseRecord, TriageState};
pub use session::{TriageSession, UserEvent};
pub use summarizer::Summarizer;
pub use transcript::{Speaker, Transcript, TranscriptEntry};
