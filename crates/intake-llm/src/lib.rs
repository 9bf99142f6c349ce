//! Intake LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `intake-domain`, used as
//! the intent oracle of the pipeline.
//!
//! # Providers
//!
//! - `MockProvider`: Deterministic mock for testing
//! - `GeminiProvider`: Google Gemini `generateContent` API
//!
//! # Examples
//!
//! ```
//! use intake_llm::MockProvider;
//! use intake_domain::Completion;
//! use intake_domain::traits::LlmProvider;
//!
//! let provider = MockProvider::new(r#"{"intent": "Invoice"}"#);
//! let result = provider.generate("test prompt").unwrap();
//! assert_eq!(result, Completion::Text(r#"{"intent": "Invoice"}"#.to_string()));
//! ```

#![warn(missing_docs)]

pub mod gemini;

use intake_domain::traits::LlmProvider as LlmProviderTrait;
use intake_domain::Completion;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiProvider};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// No API credential was supplied
    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// The backend rejected the credential
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from LLM
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),
}

/// What the mock answers with
#[derive(Debug, Clone)]
enum MockReply {
    Completion(Completion),
    Error,
}

/// Deterministic stand-in for the intent oracle
///
/// Answers from a prompt table, falling back to one default reply, and
/// counts calls across clones so tests can assert the oracle was skipped.
///
/// # Examples
///
/// ```
/// use intake_llm::MockProvider;
/// use intake_domain::Completion;
/// use intake_domain::traits::LlmProvider;
///
/// let mut provider = MockProvider::new(r#"{"intent": "Other"}"#);
/// provider.add_response("invoice prompt", r#"{"intent": "Invoice"}"#);
/// provider.add_blocked("unsafe prompt", "SAFETY");
///
/// assert_eq!(
///     provider.generate("invoice prompt").unwrap(),
///     Completion::Text(r#"{"intent": "Invoice"}"#.to_string())
/// );
/// assert!(matches!(provider.generate("unsafe prompt").unwrap(), Completion::Blocked { .. }));
/// assert_eq!(provider.call_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    fallback: MockReply,
    scripted: Arc<Mutex<HashMap<String, MockReply>>>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    /// Answer every prompt with `response` as text
    pub fn new(response: impl Into<String>) -> Self {
        Self::with_completion(Completion::Text(response.into()))
    }

    /// Answer every prompt with `completion`
    pub fn with_completion(completion: Completion) -> Self {
        Self::with_fallback(MockReply::Completion(completion))
    }

    /// Fail every call, as an unreachable backend would
    pub fn failing() -> Self {
        Self::with_fallback(MockReply::Error)
    }

    fn with_fallback(fallback: MockReply) -> Self {
        Self {
            fallback,
            scripted: Arc::default(),
            calls: Arc::default(),
        }
    }

    /// Script a text answer for one prompt
    pub fn add_response(&mut self, prompt: impl Into<String>, response: impl Into<String>) {
        self.script(prompt.into(), MockReply::Completion(Completion::Text(response.into())));
    }

    /// Script a safety block for one prompt
    pub fn add_blocked(&mut self, prompt: impl Into<String>, reason: impl Into<String>) {
        let reason = reason.into();
        self.script(prompt.into(), MockReply::Completion(Completion::Blocked { reason }));
    }

    /// Script a call failure for one prompt
    pub fn add_error(&mut self, prompt: impl Into<String>) {
        self.script(prompt.into(), MockReply::Error);
    }

    /// Number of `generate` calls so far, shared between clones
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Reset the call counter
    pub fn reset_call_count(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    fn script(&mut self, prompt: String, reply: MockReply) {
        self.table().insert(prompt, reply);
    }

    fn table(&self) -> MutexGuard<'_, HashMap<String, MockReply>> {
        self.scripted.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

impl LlmProviderTrait for MockProvider {
    type Error = LlmError;

    fn generate(&self, prompt: &str) -> Result<Completion, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let reply = self.table().get(prompt).cloned();
        match reply.unwrap_or_else(|| self.fallback.clone()) {
            MockReply::Completion(completion) => Ok(completion),
            MockReply::Error => Err(LlmError::Communication("mock backend unreachable".to_string())),
        }
    }
}
