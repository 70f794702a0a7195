//! Triage configuration.
//!
//! One TOML file; every field has a sensible default so a missing file means
//! "run with local defaults", and `llm.enabled = false` means fully offline
//! (every capability call fails open to its deterministic fallback).

use crate::error::TriageError;
use crate::llm_client::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub llm: LlmConfig,
}

impl TriageConfig {
    /// Load from a TOML file. A missing file yields defaults; a malformed
    /// file is an error worth failing loudly on.
    pub fn load(path: &Path) -> Result<Self, TriageError> {
        if !path.exists() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&raw)?;
        Ok(config)
    }
}
