//! Request and result records of the processing pipeline

use crate::{ConversationId, DocumentFormat, IntentFailure, IntentOutcome};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};

/// Input to a processing call: a file to read or raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Path to a file on the local filesystem
    File(PathBuf),

    /// Raw text content
    Raw(String),
}

impl InputSource {
    /// Input read from a file path
    pub fn file(path: impl Into<PathBuf>) -> Self {
        InputSource::File(path.into())
    }

    /// Input passed as raw text
    pub fn raw(text: impl Into<String>) -> Self {
        InputSource::Raw(text.into())
    }

    /// Whether the input names a file
    pub fn is_path(&self) -> bool {
        matches!(self, InputSource::File(_))
    }

    /// The file path, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            InputSource::File(path) => Some(path),
            InputSource::Raw(_) => None,
        }
    }

    /// Source type as recorded in the conversation log
    pub fn source_type(&self) -> &'static str {
        match self {
            InputSource::File(_) => "file_path",
            InputSource::Raw(_) => "raw_string",
        }
    }
}

/// Terminal status of a processing call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProcessStatus {
    /// Format, intent and extraction all succeeded
    Processed,

    /// Format detection failed, nothing else ran
    Error,

    /// Intent classification failed, extraction was skipped
    IntentFailed(IntentFailure),

    /// JSON content could not be re-parsed for extraction
    JsonProcessing,

    /// An extractor failed unexpectedly for the given format
    ProcessingUnexpected(DocumentFormat),

    /// PDF text extraction failed for some or all of the document
    PdfParsing,
}

impl ProcessStatus {
    /// Whether the call finished without any failure
    pub fn is_success(&self) -> bool {
        matches!(self, ProcessStatus::Processed)
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessStatus::Processed => f.write_str("Processed"),
            ProcessStatus::Error => f.write_str("Error"),
            ProcessStatus::IntentFailed(failure) => write!(f, "Failed_{}", failure),
            ProcessStatus::JsonProcessing => f.write_str("Failed_JSON_Processing"),
            ProcessStatus::ProcessingUnexpected(format) => {
                write!(f, "Failed_{}_Processing_Unexpected", format.processing_label())
            }
            ProcessStatus::PdfParsing => f.write_str("Failed_PDF_Parsing"),
        }
    }
}

impl Serialize for ProcessStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Terminal response of a processing call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessResult {
    /// Derived status
    pub status: ProcessStatus,

    /// Detected format
    pub format: DocumentFormat,

    /// Intent outcome; `None` only when format detection failed
    pub intent: Option<IntentOutcome>,

    /// Extracted fields, or a diagnostic snippet on failure
    pub output: Map<String, Value>,

    /// Non-fatal data-quality findings
    pub anomalies: Vec<String>,

    /// Conversation under which every step was logged
    pub conversation_id: ConversationId,

    /// Error message of the failing stage, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Intent;

    #[test]
    fn test_status_strings() {
        assert_eq!(ProcessStatus::Processed.to_string(), "Processed");
        assert_eq!(ProcessStatus::Error.to_string(), "Error");
        assert_eq!(
            ProcessStatus::IntentFailed(IntentFailure::EmptyInput).to_string(),
            "Failed_Unknown_EmptyInput"
        );
        assert_eq!(
            ProcessStatus::IntentFailed(IntentFailure::ClientNotInitialized).to_string(),
            "Failed_Error_ClientNotInitialized"
        );
        assert_eq!(ProcessStatus::JsonProcessing.to_string(), "Failed_JSON_Processing");
        assert_eq!(
            ProcessStatus::ProcessingUnexpected(DocumentFormat::Email).to_string(),
            "Failed_Email_Processing_Unexpected"
        );
        assert_eq!(ProcessStatus::PdfParsing.to_string(), "Failed_PDF_Parsing");
    }

    #[test]
    fn test_input_source() {
        let file = InputSource::file("/tmp/a.txt");
        assert!(file.is_path());
        assert_eq!(file.source_type(), "file_path");
        assert_eq!(file.path(), Some(Path::new("/tmp/a.txt")));

        let raw = InputSource::raw("hello");
        assert!(!raw.is_path());
        assert_eq!(raw.source_type(), "raw_string");
        assert!(raw.path().is_none());
    }

    #[test]
    fn test_result_serialization() {
        let result = ProcessResult {
            status: ProcessStatus::Processed,
            format: DocumentFormat::Email,
            intent: Some(IntentOutcome::Classified(Intent::Complaint)),
            output: Map::new(),
            anomalies: vec![],
            conversation_id: ConversationId::new(),
            message: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "Processed");
        assert_eq!(value["format"], "Email");
        assert_eq!(value["intent"], "Complaint");
        assert!(value.get("message").is_none());
    }
}
