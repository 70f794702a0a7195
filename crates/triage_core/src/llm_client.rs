//! LLM client abstraction for the triage capabilities.
//!
//! The statement evaluator needs strict-JSON responses; the summarizer needs
//! plain prose. Both go through one [`LlmClient`] trait so the session can be
//! tested with a [`FakeLlmClient`] and run offline with `enabled = false`.
//! Callers never see these errors bubble out of a session turn: the adapters
//! in [`crate::evaluator`] and [`crate::summarizer`] fail open.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// LLM backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "http://localhost:11434".to_string(),
            model: "llama3.2:3b".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

/// LLM call errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    #[error("LLM is disabled in configuration")]
    Disabled,

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Invalid JSON response: {0}")]
    InvalidJson(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("LLM returned empty response")]
    EmptyResponse,
}

/// Generic LLM client.
pub trait LlmClient: Send + Sync {
    /// Call with a prompt and expect a JSON object matching `schema_description`.
    fn call_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_description: &str,
    ) -> Result<serde_json::Value, LlmError>;

    /// Call with a prompt and expect free text.
    fn call_text(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError>;
}

/// HTTP client speaking Ollama-style or OpenAI-compatible endpoints.
pub struct HttpLlmClient {
    config: LlmConfig,
    client: reqwest::blocking::Client,
}

impl HttpLlmClient {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { config, client })
    }

    fn is_ollama_endpoint(&self) -> bool {
        self.config.endpoint.contains("11434") || self.config.endpoint.contains("ollama")
    }

    fn map_send_error(&self, e: reqwest::Error) -> LlmError {
        if e.is_timeout() {
            LlmError::Timeout(self.config.timeout_secs)
        } else {
            LlmError::HttpError(format!("Request failed: {}", e))
        }
    }

    /// Ollama `/api/generate`. `json_format` turns on constrained JSON output.
    fn call_ollama(&self, prompt: &str, json_format: bool) -> Result<String, LlmError> {
        let url = format!("{}/api/generate", self.config.endpoint);

        let mut request_body = serde_json::json!({
            "model": self.config.model,
            "prompt": prompt,
            "stream": false,
        });
        if json_format {
            request_body["format"] = serde_json::json!("json");
        }

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!("HTTP {} from Ollama", response.status())));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        response_json
            .get("response")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    /// OpenAI-compatible `/v1/chat/completions`.
    fn call_openai_compatible(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_format: bool,
    ) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.endpoint);

        let mut request_body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system_prompt},
                {"role": "user", "content": user_prompt},
            ],
        });
        if json_format {
            request_body["response_format"] = serde_json::json!({"type": "json_object"});
        }

        let mut request = self.client.post(&url).json(&request_body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().map_err(|e| self.map_send_error(e))?;

        if !response.status().is_success() {
            return Err(LlmError::HttpError(format!(
                "HTTP {} from OpenAI-compatible API",
                response.status()
            )));
        }

        let response_json: serde_json::Value = response
            .json()
            .map_err(|e| LlmError::InvalidJson(format!("Failed to parse response: {}", e)))?;

        response_json
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or(LlmError::EmptyResponse)
    }

    fn call_raw(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        json_format: bool,
    ) -> Result<String, LlmError> {
        if !self.config.enabled {
            return Err(LlmError::Disabled);
        }

        if self.is_ollama_endpoint() {
            let full_prompt = format!("{}\n\n{}", system_prompt, user_prompt);
            match self.call_ollama(&full_prompt, json_format) {
                Ok(text) => return Ok(text),
                Err(e) => {
                    tracing::debug!("Ollama API failed, trying OpenAI-compatible: {}", e);
                }
            }
        }

        self.call_openai_compatible(system_prompt, user_prompt, json_format)
    }
}

impl LlmClient for HttpLlmClient {
    fn call_json(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        schema_description: &str,
    ) -> Result<serde_json::Value, LlmError> {
        let prompt_with_schema = format!(
            "{}\n\nYou must respond with valid JSON matching this schema:\n{}",
            user_prompt, schema_description
        );

        let text = self.call_raw(system_prompt, &prompt_with_schema, true)?;

        serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidJson(format!("LLM output is not valid JSON: {}", e)))
    }

    fn call_text(&self, system_prompt: &str, user_prompt: &str) -> Result<String, LlmError> {
        let text = self.call_raw(system_prompt, user_prompt, false)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(trimmed.to_string())
    }
}

/// Fake LLM client for tests: scripted responses plus a call counter.
pub struct FakeLlmClient {
    json_responses: std::sync::Mutex<Vec<Result<serde_json::Value, LlmError>>>,
    text_responses: std::sync::Mutex<Vec<Result<String, LlmError>>>,
    call_count: std::sync::Mutex<usize>,
}

impl FakeLlmClient {
    pub fn new(
        json_responses: Vec<Result<serde_json::Value, LlmError>>,
        text_responses: Vec<Result<String, LlmError>>,
    ) -> Self {
        Self {
            json_responses: std::sync::Mutex::new(json_responses),
            text_responses: std::sync::Mutex::new(text_responses),
            call_count: std::sync::Mutex::new(0),
        }
    }

    /// Always return the same JSON object and the same summary text.
    pub fn always(json: serde_json::Value, text: &str) -> Self {
        Self::new(vec![Ok(json)], vec![Ok(text.to_string())])
    }

    /// Always fail, as if the capability were unreachable.
    pub fn always_error(error: LlmError) -> Self {
        Self::new(vec![Err(error.clone())], vec![Err(error)])
    }

    /// Number of calls made (both kinds).
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn bump(&self) {
        *self.call_count.lock().unwrap() += 1;
    }

    fn next<T: Clone>(queue: &std::sync::Mutex<Vec<Result<T, LlmError>>>) -> Result<T, LlmError> {
        let mut responses = queue.lock().unwrap();
        if responses.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        if responses.len() == 1 {
            // Keep returning the last scripted response.
            responses[0].clone()
        } else {
            responses.remove(0)
        }
    }
}

impl LlmClient for FakeLlmClient {
    fn call_json(
        &self,
        _system_prompt: &str,
        _user_prompt: &str,
        _schema_description: &str,
    ) -> Result<serde_json::Value, LlmError> {
        self.bump();
        Self::next(&self.json_responses)
    }

    fn call_text(&self, _system_prompt: &str, _user_prompt: &str) -> Result<String, LlmError> {
        self.bump();
        Self::next(&self.text_responses)
    }
}
