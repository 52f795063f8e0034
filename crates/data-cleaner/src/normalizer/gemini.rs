//! Google Gemini normalizer implementation.
//!
//! This module provides the [`GeminiNormalizer`] which implements the
//! [`TextNormalizer`] trait on top of Google's Gemini API
//! (<https://ai.google.dev/>). Each call asks the model to correct the
//! spelling of, or standardize, a single value.

use std::time::Duration;

use super::TextNormalizer;
use crate::error::NormalizationError;
use anyhow::{Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Default Gemini API endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models/";

/// Default model to use for normalization.
const DEFAULT_MODEL: &str = "gemini-flash-lite-latest";

/// Default timeout for API requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default temperature for model responses (low for deterministic outputs).
const DEFAULT_TEMPERATURE: f32 = 0.1;

/// Default max tokens for responses. Values are short.
const DEFAULT_MAX_TOKENS: u32 = 64;

// Gemini API request structures
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

// Gemini API response structures
#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<Part>>,
}

/// Configuration for the Gemini normalizer.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// The model to use (e.g., "gemini-2.0-flash", "gemini-flash-lite-latest").
    pub model: String,
    /// Temperature for response generation (0.0 - 2.0).
    pub temperature: f32,
    /// Maximum tokens in the response.
    pub max_tokens: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Base URL for the API (useful for proxies or custom endpoints).
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_owned(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            base_url: DEFAULT_BASE_URL.to_owned(),
        }
    }
}

impl GeminiConfig {
    /// Create a new configuration builder.
    pub fn builder() -> GeminiConfigBuilder {
        GeminiConfigBuilder::default()
    }
}

/// Builder for [`GeminiConfig`].
#[derive(Default)]
pub struct GeminiConfigBuilder {
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: Option<u64>,
    base_url: Option<String>,
}

impl GeminiConfigBuilder {
    /// Set the model to use.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the temperature (0.0 - 2.0).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the maximum tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the per-request timeout in seconds.
    pub fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Set a custom base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> GeminiConfig {
        GeminiConfig {
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_owned()),
            temperature: self.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: self.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            timeout_secs: self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
        }
    }
}

/// Gemini-backed spelling corrector for categorical values.
///
/// The API key is passed in at construction; this type never reads the
/// environment.
///
/// # Example
///
/// ```rust,ignore
/// use data_cleaner::normalizer::{GeminiNormalizer, GeminiConfig};
///
/// let normalizer = GeminiNormalizer::new("your-api-key")?;
///
/// let config = GeminiConfig::builder()
///     .model("gemini-2.0-flash")
///     .timeout_secs(10)
///     .build();
/// let normalizer = GeminiNormalizer::with_config("your-api-key", config)?;
/// ```
pub struct GeminiNormalizer {
    api_key: String,
    config: GeminiConfig,
    client: Client,
}

impl GeminiNormalizer {
    /// Create a new Gemini normalizer with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be created.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, GeminiConfig::default())
    }

    /// Create a new Gemini normalizer with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot
    /// be created.
    pub fn with_config(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(anyhow!("Gemini API key is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn build_prompt(value: &str) -> String {
        format!(
            "Correct spelling or standardize this value for data cleaning: '{}'",
            value
        )
    }

    fn call_api(&self, prompt: &str) -> Result<String, NormalizationError> {
        let request = GeminiRequest {
            contents: vec![Content {
                role: "user".to_owned(),
                parts: vec![Part {
                    text: prompt.to_owned(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_tokens,
            },
        };

        // Build URL: {base_url}{model}:generateContent?key={api_key}
        let url = format!(
            "{}{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .map_err(|e| NormalizationError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(NormalizationError::Request(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let result: GeminiResponse = response
            .json()
            .map_err(|e| NormalizationError::Request(e.without_url().to_string()))?;

        Self::extract_text(result)
    }

    fn extract_text(result: GeminiResponse) -> Result<String, NormalizationError> {
        let candidate = result
            .candidates
            .and_then(|candidates| candidates.into_iter().next())
            .ok_or(NormalizationError::EmptyResponse)?;

        if let Some(reason) = &candidate.finish_reason
            && (reason == "SAFETY" || reason == "BLOCKED")
        {
            return Err(NormalizationError::Blocked(reason.clone()));
        }

        candidate
            .content
            .and_then(|content| content.parts)
            .and_then(|parts| parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(NormalizationError::EmptyResponse)
    }

    /// Strip whitespace and any quotes the model wrapped the value in.
    fn clean_response(text: &str) -> String {
        text.trim().trim_matches(['"', '\'', '`']).trim().to_string()
    }
}

impl TextNormalizer for GeminiNormalizer {
    fn normalize(&self, raw: &str) -> Result<String, NormalizationError> {
        let text = self.call_api(&Self::build_prompt(raw))?;
        let cleaned = Self::clean_response(&text);
        if cleaned.is_empty() {
            return Err(NormalizationError::EmptyResponse);
        }
        debug!("Gemini normalized '{}' -> '{}'", raw, cleaned);
        Ok(cleaned)
    }

    fn name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> GeminiResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = GeminiConfig::builder().model("gemini-2.0-flash").build();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(GeminiNormalizer::new("  ").is_err());
    }

    #[test]
    fn test_prompt_text() {
        let prompt = GeminiNormalizer::build_prompt("new yrok");
        assert_eq!(
            prompt,
            "Correct spelling or standardize this value for data cleaning: 'new yrok'"
        );
    }

    #[test]
    fn test_extract_text() {
        let parsed = response(
            r#"{"candidates":[{"content":{"parts":[{"text":"New York\n"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(GeminiNormalizer::extract_text(parsed).unwrap(), "New York\n");
    }

    #[test]
    fn test_extract_text_blocked() {
        let parsed = response(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert_eq!(
            GeminiNormalizer::extract_text(parsed).unwrap_err(),
            NormalizationError::Blocked("SAFETY".to_string())
        );
    }

    #[test]
    fn test_extract_text_empty() {
        let parsed = response(r#"{}"#);
        assert_eq!(
            GeminiNormalizer::extract_text(parsed).unwrap_err(),
            NormalizationError::EmptyResponse
        );
    }

    #[test]
    fn test_clean_response_strips_quotes() {
        assert_eq!(GeminiNormalizer::clean_response("  'New York'\n"), "New York");
        assert_eq!(GeminiNormalizer::clean_response("\"Boston\""), "Boston");
    }
}
