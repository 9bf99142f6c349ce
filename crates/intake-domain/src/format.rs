//! Format module - structural document types and detection results

use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural type of an input, or the reason it could not be determined
///
/// The three `Error*` variants end the pipeline before intent
/// classification. `UnknownEmptyInput` is not an error: it is carried
/// through to a failed intent status with a full conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Syntactically valid JSON object or array
    #[serde(rename = "JSON")]
    Json,

    /// Text carrying email header signatures
    #[serde(rename = "Email")]
    Email,

    /// PDF file whose text layer was extracted
    #[serde(rename = "PDF")]
    Pdf,

    /// Plain text read from a file
    #[serde(rename = "TextFile")]
    TextFile,

    /// Plain text passed as a raw string
    #[serde(rename = "Text")]
    Text,

    /// Raw string input that was empty or whitespace only
    #[serde(rename = "Unknown_EmptyInput")]
    UnknownEmptyInput,

    /// Input path does not exist
    #[serde(rename = "Error_FileNotFound")]
    ErrorFileNotFound,

    /// PDF text extraction failed
    #[serde(rename = "Error_PDFParsing")]
    ErrorPdfParsing,

    /// File exists but could not be read as UTF-8 text
    #[serde(rename = "Error_FileRead")]
    ErrorFileRead,
}

impl DocumentFormat {
    /// Get the external tag for this format
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Email => "Email",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::TextFile => "TextFile",
            DocumentFormat::Text => "Text",
            DocumentFormat::UnknownEmptyInput => "Unknown_EmptyInput",
            DocumentFormat::ErrorFileNotFound => "Error_FileNotFound",
            DocumentFormat::ErrorPdfParsing => "Error_PDFParsing",
            DocumentFormat::ErrorFileRead => "Error_FileRead",
        }
    }

    /// Parse a format from its external tag
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "JSON" => Some(DocumentFormat::Json),
            "Email" => Some(DocumentFormat::Email),
            "PDF" => Some(DocumentFormat::Pdf),
            "TextFile" => Some(DocumentFormat::TextFile),
            "Text" => Some(DocumentFormat::Text),
            "Unknown_EmptyInput" => Some(DocumentFormat::UnknownEmptyInput),
            "Error_FileNotFound" => Some(DocumentFormat::ErrorFileNotFound),
            "Error_PDFParsing" => Some(DocumentFormat::ErrorPdfParsing),
            "Error_FileRead" => Some(DocumentFormat::ErrorFileRead),
            _ => None,
        }
    }

    /// Whether this format terminates the pipeline early
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            DocumentFormat::ErrorFileNotFound
                | DocumentFormat::ErrorPdfParsing
                | DocumentFormat::ErrorFileRead
        )
    }

    /// Name used in `Failed_<Format>_Processing_Unexpected` statuses
    pub fn processing_label(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "JSON",
            DocumentFormat::Email => "Email",
            DocumentFormat::Pdf => "PDF",
            DocumentFormat::TextFile | DocumentFormat::Text => "Text",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid document format: {}", s))
    }
}

/// Kind of condition recorded by the format detector
///
/// Downstream stages match on the kind, never on the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Input path does not exist
    FileNotFound,
    /// File could not be read or decoded
    FileRead,
    /// PDF extraction failed, fully or for some pages
    PdfParsing,
    /// Raw string input was empty
    EmptyInput,
    /// File input was empty (not fatal)
    EmptyFile,
}

/// A detector finding with a human-readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// What happened
    pub kind: DiagnosticKind,

    /// Details for logs and callers
    pub message: String,
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Output of the format detector
///
/// Constructors enforce the shape: error formats carry no content and
/// always carry a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Determined format
    pub format: DocumentFormat,

    /// Analyzable text (empty for error and empty-input formats)
    pub content: String,

    /// Optional detector finding
    pub diagnostic: Option<Diagnostic>,
}

impl DetectionResult {
    /// A successful detection with analyzable content
    pub fn detected(format: DocumentFormat, content: impl Into<String>) -> Self {
        Self {
            format,
            content: content.into(),
            diagnostic: None,
        }
    }

    /// A successful detection that still recorded a finding
    pub fn with_diagnostic(
        format: DocumentFormat,
        content: impl Into<String>,
        diagnostic: Diagnostic,
    ) -> Self {
        Self {
            format,
            content: content.into(),
            diagnostic: Some(diagnostic),
        }
    }

    /// A terminal detection failure
    pub fn failed(format: DocumentFormat, diagnostic: Diagnostic) -> Self {
        debug_assert!(format.is_error(), "{} is not an error format", format);
        Self {
            format,
            content: String::new(),
            diagnostic: Some(diagnostic),
        }
    }

    /// Raw string input with nothing to analyze
    pub fn empty_input() -> Self {
        Self {
            format: DocumentFormat::UnknownEmptyInput,
            content: String::new(),
            diagnostic: Some(Diagnostic::new(
                DiagnosticKind::EmptyInput,
                "Input content is empty or whitespace.",
            )),
        }
    }

    /// Whether the detector recorded a PDF parsing problem
    pub fn has_pdf_parsing_failure(&self) -> bool {
        matches!(
            self.diagnostic,
            Some(Diagnostic {
                kind: DiagnosticKind::PdfParsing,
                ..
            })
        )
    }

    /// Diagnostic message, if any
    pub fn diagnostic_message(&self) -> Option<&str> {
        self.diagnostic.as_ref().map(|d| d.message.as_str())
    }
}
