//! Intake Storage Layer
//!
//! Implements the `ConversationLog` trait over any `KeyValueStore` backend.
//! Each conversation is stored under `conversation:<id>` as a JSON array of
//! timestamped entries; an append reads the array, pushes one entry and
//! writes it back.
//!
//! # Availability
//!
//! The log never fails its callers. A backend that does not answer the
//! startup `PING` puts the log in degraded mode (appends are dropped, reads
//! are empty), and individual backend errors are reported with `warn!` and
//! swallowed.
//!
//! # Examples
//!
//! ```
//! use intake_domain::{ConversationId, LogEvent, Stage};
//! use intake_domain::traits::ConversationLog;
//! use intake_store::{MemoryBackend, SharedLog};
//!
//! let log = SharedLog::connect(MemoryBackend::new());
//! let id = ConversationId::new();
//! log.append(&id, LogEvent::new(Stage::RequestReceived, "RECEIVED", serde_json::json!({})));
//! assert_eq!(log.read(&id).len(), 1);
//! ```

#![warn(missing_docs)]

pub mod memory;
pub mod redis_backend;

use intake_domain::traits::{ConversationLog, KeyValueStore};
use intake_domain::{ConversationId, LogEntry, LogEvent};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

pub use memory::MemoryBackend;
pub use redis_backend::{RedisBackend, RedisSettings};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Redis client or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Stored value could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backend is not reachable
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Key holds something that cannot be read back as a stored history
    #[error("Unreadable stored value: {0}")]
    CorruptValue(String),
}

impl StoreError {
    /// Whether the error concerns the stored value rather than the backend
    pub fn is_corrupt_value(&self) -> bool {
        matches!(self, StoreError::CorruptValue(_))
    }
}

/// Append-only conversation log over a key-value backend
///
/// Construct with [`SharedLog::connect`], which health-checks the backend,
/// or [`SharedLog::disabled`] for a log that records nothing.
#[derive(Debug)]
pub struct SharedLog<B> {
    backend: Option<B>,
}

impl<B> SharedLog<B>
where
    B: KeyValueStore<Error = StoreError>,
{
    /// Wrap a backend, falling back to degraded mode if it does not answer `PING`
    pub fn connect(backend: B) -> Self {
        match backend.ping() {
            Ok(()) => {
                info!("Conversation log backend connected");
                Self {
                    backend: Some(backend),
                }
            }
            Err(e) => {
                warn!(error = %e, "Conversation log backend unreachable, logging disabled");
                Self { backend: None }
            }
        }
    }

    /// A log that drops every append and reads nothing
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// Whether appends reach a backend
    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn load_history(backend: &B, key: &str) -> Result<Vec<Value>, StoreError> {
        let raw = match backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(e) if e.is_corrupt_value() => {
                warn!(key, error = %e, "Stored history is unreadable, starting new history");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(_) => {
                warn!(key, "Stored history is not a list, starting new history");
                Ok(Vec::new())
            }
            Err(e) => {
                warn!(key, error = %e, "Could not decode stored history, starting new history");
                Ok(Vec::new())
            }
        }
    }

    fn try_append(backend: &B, key: &str, entry: &LogEntry) -> Result<(), String> {
        let mut history = Self::load_history(backend, key).map_err(|e| e.to_string())?;
        let value = serde_json::to_value(entry).map_err(|e| e.to_string())?;
        history.push(value);

        let encoded = serde_json::to_string(&history).map_err(|e| e.to_string())?;
        backend.set(key, &encoded).map_err(|e| e.to_string())
    }
}

impl<B> ConversationLog for SharedLog<B>
where
    B: KeyValueStore<Error = StoreError>,
{
    fn append(&self, conversation_id: &ConversationId, event: LogEvent) {
        let Some(backend) = &self.backend else {
            warn!(
                conversation_id = %conversation_id,
                stage = event.stage.as_str(),
                "Cannot log event, conversation log unavailable"
            );
            return;
        };

        let key = conversation_id.storage_key();
        let entry = LogEntry::stamp(event);

        match Self::try_append(backend, &key, &entry) {
            Ok(()) => debug!(key = %key, stage = entry.event.stage.as_str(), "Logged event"),
            Err(e) => warn!(key = %key, error = %e, "Store error during append"),
        }
    }

    fn read(&self, conversation_id: &ConversationId) -> Vec<LogEntry> {
        let Some(backend) = &self.backend else {
            warn!(conversation_id = %conversation_id, "Cannot read history, conversation log unavailable");
            return Vec::new();
        };

        let key = conversation_id.storage_key();
        let items = match Self::load_history(backend, &key) {
            Ok(items) => items,
            Err(e) => {
                warn!(key = %key, error = %e, "Store error during read");
                return Vec::new();
            }
        };

        items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(key = %key, index, error = %e, "Skipping undecodable history entry");
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::Stage;
    use serde_json::json;

    fn event(stage: Stage, status: &str) -> LogEvent {
        LogEvent::new(stage, status, json!({"n": status}))
    }

    #[test]
    fn test_connect_healthy_backend() {
        let log = SharedLog::connect(MemoryBackend::new());
        assert!(log.is_available());
    }

    #[test]
    fn test_connect_unreachable_backend_degrades() {
        let log = SharedLog::connect(MemoryBackend::unreachable());
        assert!(!log.is_available());

        let id = ConversationId::new();
        log.append(&id, event(Stage::RequestReceived, "RECEIVED"));
        assert!(log.read(&id).is_empty());
    }

    #[test]
    fn test_disabled_log() {
        let log: SharedLog<MemoryBackend> = SharedLog::disabled();
        let id = ConversationId::new();
        log.append(&id, event(Stage::RequestReceived, "RECEIVED"));
        assert!(log.read(&id).is_empty());
    }

    #[test]
    fn test_append_preserves_order() {
        let log = SharedLog::connect(MemoryBackend::new());
        let id = ConversationId::new();

        log.append(&id, event(Stage::RequestReceived, "a"));
        log.append(&id, event(Stage::FormatDetermined, "b"));
        log.append(&id, event(Stage::ProcessingResult, "c"));

        let history = log.read(&id);
        let statuses: Vec<_> = history.iter().map(|e| e.event.status.as_str()).collect();
        assert_eq!(statuses, vec!["a", "b", "c"]);
        assert!(history.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_unknown_conversation_is_empty() {
        let log = SharedLog::connect(MemoryBackend::new());
        assert!(log.read(&ConversationId::new()).is_empty());
    }

    #[test]
    fn test_corrupted_value_is_replaced_on_append() {
        let backend = MemoryBackend::new();
        let id = ConversationId::new();
        backend.insert_raw(&id.storage_key(), "not json at all");

        let log = SharedLog::connect(backend);
        assert!(log.read(&id).is_empty());

        log.append(&id, event(Stage::RequestReceived, "fresh"));
        let history = log.read(&id);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event.status, "fresh");
    }

    #[test]
    fn test_unreadable_value_is_replaced_on_append() {
        let backend = MemoryBackend::new();
        let id = ConversationId::new();
        backend.insert_unreadable(&id.storage_key());

        let log = SharedLog::connect(backend.clone());
        assert!(log.read(&id).is_empty());

        log.append(&id, event(Stage::RequestReceived, "first"));
        log.append(&id, event(Stage::FormatDetermined, "second"));

        let history = log.read(&id);
        let statuses: Vec<_> = history.iter().map(|e| e.event.status.as_str()).collect();
        assert_eq!(statuses, vec!["first", "second"]);
        assert!(backend.get(&id.storage_key()).is_ok());
    }

    #[test]
    fn test_non_list_value_is_empty_history() {
        let backend = MemoryBackend::new();
        let id = ConversationId::new();
        backend.insert_raw(&id.storage_key(), r#"{"stage": "request_received"}"#);

        let log = SharedLog::connect(backend);
        assert!(log.read(&id).is_empty());
    }

    #[test]
    fn test_undecodable_entries_are_skipped() {
        let backend = MemoryBackend::new();
        let id = ConversationId::new();
        backend.insert_raw(
            &id.storage_key(),
            r#"[
                {"timestamp": "2026-01-05T10:00:00Z", "stage": "request_received", "status": "RECEIVED", "payload": {}},
                {"unexpected": true},
                {"timestamp": "2026-01-05T10:00:01Z", "stage": "format_determined", "status": "JSON"}
            ]"#,
        );

        let log = SharedLog::connect(backend);
        let history = log.read(&id);
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].event.stage, Stage::FormatDetermined);
        assert_eq!(history[1].event.payload, Value::Null);
    }

    #[test]
    fn test_backend_errors_are_swallowed() {
        let backend = MemoryBackend::new();
        let id = ConversationId::new();
        let log = SharedLog::connect(backend.clone());

        backend.set_failing(true);
        log.append(&id, event(Stage::RequestReceived, "lost"));
        assert!(log.read(&id).is_empty());

        backend.set_failing(false);
        assert!(log.read(&id).is_empty());
    }
}
