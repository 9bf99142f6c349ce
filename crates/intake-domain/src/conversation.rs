//! Conversation module - identity and event history of one processing run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Unique identifier for a conversation based on UUIDv7
///
/// A fresh id is generated at the start of every processing call and is
/// never reused. UUIDv7 keeps ids chronologically sortable in the log store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConversationId(uuid::Uuid);

impl ConversationId {
    /// Generate a new UUIDv7-based ConversationId
    ///
    /// # Examples
    ///
    /// ```
    /// use intake_domain::ConversationId;
    ///
    /// let a = ConversationId::new();
    /// let b = ConversationId::new();
    /// assert_ne!(a, b);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Parse a ConversationId from its hyphenated string form
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| format!("Invalid conversation id: {}", e))
    }

    /// Key under which this conversation's history is stored
    pub fn storage_key(&self) -> String {
        format!("conversation:{}", self.0)
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl Serialize for ConversationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConversationId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// Pipeline stage that produced a log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Request metadata recorded at the start of processing
    RequestReceived,
    /// Format detector finished
    FormatDetermined,
    /// Format detector returned an error tag
    FormatDeterminationFailed,
    /// Intent classification finished
    IntentDetermined,
    /// Final routed result
    ProcessingResult,
}

impl Stage {
    /// Get the stage name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::RequestReceived => "request_received",
            Stage::FormatDetermined => "format_determined",
            Stage::FormatDeterminationFailed => "format_determination_failed",
            Stage::IntentDetermined => "intent_determined",
            Stage::ProcessingResult => "processing_result",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event to append to a conversation's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Stage that produced the event
    pub stage: Stage,

    /// Stage status (e.g. `"OK"`, `"FAILED_FORMAT_DETERMINATION"`, a process status)
    pub status: String,

    /// Stage-specific details
    #[serde(default)]
    pub payload: Value,
}

impl LogEvent {
    /// Create a new event
    pub fn new(stage: Stage, status: impl Into<String>, payload: Value) -> Self {
        Self {
            stage,
            status: status.into(),
            payload,
        }
    }
}

/// A stored event, stamped at append time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// UTC time the event was appended
    pub timestamp: DateTime<Utc>,

    /// The event itself
    #[serde(flatten)]
    pub event: LogEvent,
}

impl LogEntry {
    /// Stamp an event with the current UTC time
    pub fn stamp(event: LogEvent) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}
