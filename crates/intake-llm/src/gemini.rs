//! Gemini Provider Implementation
//!
//! Calls Google's `generateContent` API with a blocking HTTP client. One
//! request per prompt, no retries: a failed call surfaces as an `LlmError`
//! and the caller decides what to do with it.
//!
//! # Examples
//!
//! ```no_run
//! use intake_llm::{GeminiConfig, GeminiProvider};
//! use intake_domain::traits::LlmProvider;
//!
//! let provider = GeminiProvider::new("api-key", GeminiConfig::default()).unwrap();
//! let completion = provider.generate("Say hello").unwrap();
//! ```

use crate::LlmError;
use intake_domain::traits::LlmProvider as LlmProviderTrait;
use intake_domain::Completion;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model used for intent classification
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";

/// Default timeout for LLM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

const BLOCKING_FINISH_REASONS: [&str; 3] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST"];

/// Connection and sampling settings for the Gemini provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL
    pub endpoint: String,

    /// Model name (without the `models/` prefix)
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,

    /// Top-k sampling limit
    pub top_k: u32,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,

    /// HTTP request timeout (seconds)
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 256,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Gemini API provider
pub struct GeminiProvider {
    api_key: String,
    config: GeminiConfig,
    client: reqwest::blocking::Client,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("endpoint", &self.config.endpoint)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

/// Request body for the generateContent API
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

/// Response from the generateContent API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
    block_reason_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingCredential` for a blank API key and
    /// `LlmError::Communication` if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>, config: GeminiConfig) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingCredential(
                "Gemini API key is required but not provided".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Communication(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_key,
            config,
            client,
        })
    }

    /// Model this provider talks to
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        )
    }

    fn request_body<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                top_k: self.config.top_k,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
        }
    }
}

impl LlmProviderTrait for GeminiProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<Completion, Self::Error> {
        debug!(model = %self.config.model, prompt_chars = prompt.chars().count(), "Calling Gemini");

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(error_for_status(status, &body, &self.config.model));
        }

        parse_completion(&body)
    }
}

/// Map a non-success HTTP answer to an `LlmError`
fn error_for_status(status: reqwest::StatusCode, body: &str, model: &str) -> LlmError {
    let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = api_error
        .as_ref()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| body.to_string());

    let invalid_key = api_error
        .as_ref()
        .map(|e| e.message.contains("API key not valid") || e.status == "PERMISSION_DENIED")
        .unwrap_or(false);

    match status {
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
            LlmError::Authentication(message)
        }
        _ if invalid_key => LlmError::Authentication(format!(
            "{} (check GEMINI_API_KEY)",
            message
        )),
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        _ => LlmError::Communication(format!("HTTP {}: {}", status, message)),
    }
}

/// Turn a generateContent response body into a `Completion`
fn parse_completion(body: &str) -> Result<Completion, LlmError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(feedback) = &response.prompt_feedback {
        if let Some(reason) = &feedback.block_reason {
            let reason = feedback
                .block_reason_message
                .clone()
                .unwrap_or_else(|| reason.clone());
            return Ok(Completion::Blocked { reason });
        }
    }

    let text: String = response
        .candidates
        .iter()
        .filter_map(|c| c.content.as_ref())
        .flat_map(|content| content.parts.iter())
        .filter_map(|part| part.text.as_deref())
        .collect();

    if !text.trim().is_empty() {
        return Ok(Completion::Text(text));
    }

    let blocked_finish = response
        .candidates
        .iter()
        .filter_map(|c| c.finish_reason.as_deref())
        .find(|reason| BLOCKING_FINISH_REASONS.contains(reason));

    match blocked_finish {
        Some(reason) => Ok(Completion::Blocked {
            reason: reason.to_string(),
        }),
        None => Ok(Completion::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_requires_key() {
        let result = GeminiProvider::new("  ", GeminiConfig::default());
        assert!(matches!(result, Err(LlmError::MissingCredential(_))));
    }

    #[test]
    fn test_provider_creation() {
        let provider = GeminiProvider::new("key", GeminiConfig::default()).unwrap();
        assert_eq!(provider.model(), DEFAULT_MODEL);
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash-latest:generateContent"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let provider = GeminiProvider::new("super-secret", GeminiConfig::default()).unwrap();
        let debug = format!("{:?}", provider);
        assert!(!debug.contains("super-secret"));
    }

    #[test]
    fn test_request_body_shape() {
        let provider = GeminiProvider::new("key", GeminiConfig::default()).unwrap();
        let body = serde_json::to_value(provider.request_body("classify me")).unwrap();

        assert_eq!(body["contents"][0]["parts"][0]["text"], "classify me");
        assert_eq!(body["generationConfig"]["topK"], 1);
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 256);
        assert_eq!(body["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(body["safetySettings"][0]["threshold"], "BLOCK_NONE");
    }

    #[test]
    fn test_parse_text_completion() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "{\"intent\": "}, {"text": "\"RFQ\"}"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(
            parse_completion(body).unwrap(),
            Completion::Text(r#"{"intent": "RFQ"}"#.to_string())
        );
    }

    #[test]
    fn test_parse_prompt_block() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        assert_eq!(
            parse_completion(body).unwrap(),
            Completion::Blocked {
                reason: "SAFETY".to_string()
            }
        );

        let body = r#"{"promptFeedback": {"blockReason": "OTHER", "blockReasonMessage": "nope"}}"#;
        assert_eq!(
            parse_completion(body).unwrap(),
            Completion::Blocked {
                reason: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_parse_candidate_safety_finish() {
        let body = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        assert!(matches!(
            parse_completion(body).unwrap(),
            Completion::Blocked { .. }
        ));
    }

    #[test]
    fn test_parse_empty_completion() {
        assert_eq!(parse_completion(r#"{"candidates": []}"#).unwrap(), Completion::Empty);
        assert_eq!(parse_completion("{}").unwrap(), Completion::Empty);
    }

    #[test]
    fn test_parse_invalid_body() {
        assert!(matches!(
            parse_completion("<html>"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_error_mapping() {
        let invalid_key = r#"{"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}"#;
        assert!(matches!(
            error_for_status(reqwest::StatusCode::BAD_REQUEST, invalid_key, "m"),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            error_for_status(reqwest::StatusCode::NOT_FOUND, "", "m"),
            LlmError::ModelNotAvailable(_)
        ));
        assert!(matches!(
            error_for_status(reqwest::StatusCode::TOO_MANY_REQUESTS, "", "m"),
            LlmError::RateLimitExceeded
        ));
        assert!(matches!(
            error_for_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "boom", "m"),
            LlmError::Communication(_)
        ));
    }

    #[test]
    fn test_error_handling_unreachable_endpoint() {
        let config = GeminiConfig {
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..GeminiConfig::default()
        };
        let provider = GeminiProvider::new("key", config).unwrap();

        match provider.generate("test") {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    // Integration test (requires GEMINI_API_KEY and network access)
    #[test]
    #[ignore]
    fn test_gemini_generate_integration() {
        let key = std::env::var("GEMINI_API_KEY").unwrap_or_default();
        let provider = GeminiProvider::new(key, GeminiConfig::default()).unwrap();
        let result = provider.generate(r#"Reply with exactly {"intent": "Other"}"#);
        assert!(result.is_ok());
    }
}
