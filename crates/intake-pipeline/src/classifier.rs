//! Intent classification through an LLM oracle

use crate::parser::parse_intent_response;
use crate::prompt::PromptBuilder;
use intake_domain::traits::LlmProvider;
use intake_domain::{Completion, IntentFailure, IntentOutcome};
use std::fmt::Display;
use tracing::{debug, info, warn};

/// Classifies text into a business intent
///
/// Built without a provider, the classifier is disabled: every call answers
/// `Error_ClientNotInitialized` without contacting anything.
#[derive(Debug)]
pub struct IntentClassifier<L> {
    provider: Option<L>,
    prompts: PromptBuilder,
}

impl<L> IntentClassifier<L>
where
    L: LlmProvider,
    L::Error: Display,
{
    /// Create a classifier around an oracle
    pub fn new(provider: L, max_prompt_chars: usize) -> Self {
        Self {
            provider: Some(provider),
            prompts: PromptBuilder::new(max_prompt_chars),
        }
    }

    /// Create a classifier with no oracle
    pub fn disabled() -> Self {
        Self {
            provider: None,
            prompts: PromptBuilder::default(),
        }
    }

    /// Create a classifier from a provider construction result
    ///
    /// A failed construction is logged and yields a disabled classifier.
    pub fn from_result<E: Display>(provider: Result<L, E>, max_prompt_chars: usize) -> Self {
        match provider {
            Ok(provider) => Self::new(provider, max_prompt_chars),
            Err(e) => {
                warn!(error = %e, "Intent oracle unavailable, classification disabled");
                Self {
                    provider: None,
                    prompts: PromptBuilder::new(max_prompt_chars),
                }
            }
        }
    }

    /// Whether an oracle is configured
    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// The configured oracle, if any
    pub fn provider(&self) -> Option<&L> {
        self.provider.as_ref()
    }

    /// Classify `text`, making at most one oracle call
    pub fn classify(&self, text: &str) -> IntentOutcome {
        let Some(provider) = &self.provider else {
            warn!("Intent oracle not initialized");
            return IntentFailure::ClientNotInitialized.into();
        };

        if text.trim().is_empty() {
            debug!("Content is empty, skipping intent oracle");
            return IntentFailure::EmptyContent.into();
        }

        let prompt = self.prompts.build(text);
        let completion = match provider.generate(&prompt) {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "Intent oracle call failed");
                return IntentFailure::OracleCall.into();
            }
        };

        match completion {
            Completion::Text(response) if !response.trim().is_empty() => {
                match parse_intent_response(&response) {
                    Ok(intent) => {
                        info!(intent = intent.as_str(), "Intent classified");
                        intent.into()
                    }
                    Err(failure) => failure.into(),
                }
            }
            Completion::Text(_) | Completion::Empty => {
                warn!("Intent oracle returned an empty response");
                IntentFailure::EmptyResponse.into()
            }
            Completion::Blocked { reason } => {
                warn!(reason = %reason, "Intent prompt blocked");
                IntentFailure::PromptBlocked { reason }.into()
            }
        }
    }
}
