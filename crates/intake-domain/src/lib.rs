//! Intake Domain Layer
//!
//! Core vocabulary of the intake pipeline: the closed enumerations for
//! document formats, business intents and processing statuses, the records
//! exchanged between pipeline stages, and the trait interfaces for the
//! external collaborators (intent oracle, PDF text source, key-value store,
//! conversation log).
//!
//! ## Key Concepts
//!
//! - **Format**: structural type of the input (JSON, Email, PDF, text) or a
//!   detection error tag
//! - **Intent**: business purpose of the content, a closed set plus error tags
//! - **Conversation**: one end-to-end processing of a single input, with its
//!   append-only event history
//! - **Anomaly**: a non-fatal data-quality finding, distinct from an error
//!
//! ## Architecture
//!
//! This crate holds no I/O. Infrastructure implementations of the traits in
//! [`traits`] live in `intake-llm`, `intake-store` and `intake-pipeline`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod conversation;
pub mod format;
pub mod intent;
pub mod outcome;
pub mod traits;

// Re-exports for convenience
pub use conversation::{ConversationId, LogEntry, LogEvent, Stage};
pub use format::{DetectionResult, Diagnostic, DiagnosticKind, DocumentFormat};
pub use intent::{Intent, IntentFailure, IntentOutcome};
pub use outcome::{InputSource, ProcessResult, ProcessStatus};
pub use traits::{Completion, PdfText};
