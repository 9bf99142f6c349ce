//! Intake Pipeline
//!
//! Classifies an input document by structure and business intent, routes it
//! to the matching extractor, and records every step in a conversation log.
//!
//! # Architecture
//!
//! ```text
//! Input → FormatDetector → IntentClassifier → Extractor → ProcessResult
//!              │                  │               │
//!              └──────────── ConversationLog ─────┘
//! ```
//!
//! The oracle, the log and the PDF text source are injected as generic
//! parameters, so tests run the whole pipeline against in-process doubles.
//!
//! # Example Usage
//!
//! ```
//! use intake_domain::{DocumentFormat, InputSource, ProcessStatus};
//! use intake_llm::MockProvider;
//! use intake_pipeline::{IntentClassifier, Orchestrator, PdfExtractSource, PipelineConfig};
//! use intake_store::{MemoryBackend, SharedLog};
//!
//! let classifier = IntentClassifier::new(MockProvider::new(r#"{"intent": "Invoice"}"#), 8000);
//! let log = SharedLog::connect(MemoryBackend::new());
//! let orchestrator = Orchestrator::new(classifier, log, PdfExtractSource, PipelineConfig::default());
//!
//! let result = orchestrator.process(InputSource::raw(r#"{"invoice_number": "INV-1"}"#));
//! assert_eq!(result.format, DocumentFormat::Json);
//! assert_eq!(result.status, ProcessStatus::Processed);
//! ```

#![warn(missing_docs)]

mod classifier;
mod config;
mod detector;
mod error;
pub mod extractors;
mod orchestrator;
mod parser;
mod pdf;
mod prompt;


pub use classifier::IntentClassifier;
pub use config::PipelineConfig;
pub use detector::FormatDetector;
pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use parser::parse_intent_response;
pub use pdf::PdfExtractSource;
pub use prompt::PromptBuilder;
