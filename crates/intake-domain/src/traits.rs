//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and its
//! collaborators. Infrastructure implementations live in other crates.

use crate::{ConversationId, LogEntry, LogEvent};
use std::path::Path;

/// What a text-generation backend returned for a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Generated text (possibly wrapped in code fences)
    Text(String),

    /// The prompt was refused by the backend's safety filtering
    Blocked {
        /// Block reason reported by the backend
        reason: String,
    },

    /// The backend answered with no text and no block reason
    Empty,
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (intake-llm)
pub trait LlmProvider {
    /// Error type for LLM operations
    type Error;

    /// Generate a completion for a prompt
    fn generate(&self, prompt: &str) -> Result<Completion, Self::Error>;
}

/// Text extracted from a PDF document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    /// Concatenated page text (may be empty)
    pub text: String,

    /// 1-based numbers of pages whose text could not be decoded
    pub unreadable_pages: Vec<u32>,
}

impl PdfText {
    /// Text from a fully readable document
    pub fn complete(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unreadable_pages: Vec::new(),
        }
    }

    /// Whether some pages could not be decoded
    pub fn is_partial(&self) -> bool {
        !self.unreadable_pages.is_empty()
    }
}

/// Trait for extracting text from PDF files
///
/// Implemented by the pipeline layer (intake-pipeline)
pub trait PdfTextSource {
    /// Error type for extraction operations
    type Error;

    /// Extract the text layer of a PDF
    ///
    /// `Ok(None)` means the source produced nothing usable for this path.
    fn extract_text(&self, path: &Path) -> Result<Option<PdfText>, Self::Error>;
}

/// Trait for a string key-value backend
///
/// Implemented by the infrastructure layer (intake-store)
pub trait KeyValueStore {
    /// Error type for store operations
    type Error;

    /// Connectivity health check
    fn ping(&self) -> Result<(), Self::Error>;

    /// Get the value stored under a key
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Store a value under a key, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;
}

/// Trait for the append-only conversation history
///
/// Both operations are infallible by contract: an unreachable backend turns
/// appends into no-ops and reads into empty histories.
pub trait ConversationLog {
    /// Append an event, stamping it with the current UTC time
    fn append(&self, conversation_id: &ConversationId, event: LogEvent);

    /// Read the history of a conversation, oldest first
    fn read(&self, conversation_id: &ConversationId) -> Vec<LogEntry>;
}

impl<T: ConversationLog + ?Sized> ConversationLog for &T {
    fn append(&self, conversation_id: &ConversationId, event: LogEvent) {
        (**self).append(conversation_id, event)
    }

    fn read(&self, conversation_id: &ConversationId) -> Vec<LogEntry> {
        (**self).read(conversation_id)
    }
}
