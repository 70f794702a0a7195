//! Error types for the triage engine.
//!
//! Capability failures (scoring/summarizing) are deliberately NOT represented
//! here: the adapters recover from them in place and hand the session a
//! [`crate::evaluator::CapabilityNotice`] instead. Nothing in this enum ever
//! aborts a running session; these are setup-time failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("LLM client error: {0}")]
    LlmClient(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
