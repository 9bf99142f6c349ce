//! Format detection
//!
//! Decides the structural format of an input and produces the text the rest
//! of the pipeline analyzes. Detection never fails: every problem becomes an
//! error format with a diagnostic.

use crate::extractors::parse_json;
use intake_domain::traits::PdfTextSource;
use intake_domain::{DetectionResult, Diagnostic, DiagnosticKind, DocumentFormat, InputSource};
use std::fmt::Display;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

const EMAIL_COMPANION_HEADERS: [&str; 5] =
    ["subject:", "to:", "date:", "message-id:", "mime-version:"];

/// Classifies inputs by structure
#[derive(Debug, Clone, Default)]
pub struct FormatDetector<P> {
    pdf: P,
}

impl<P> FormatDetector<P>
where
    P: PdfTextSource,
    P::Error: Display,
{
    /// Create a detector using `pdf` for `.pdf` files
    pub fn new(pdf: P) -> Self {
        Self { pdf }
    }

    /// Determine the format of an input
    pub fn detect(&self, input: &InputSource) -> DetectionResult {
        match input {
            InputSource::File(path) => self.detect_file(path),
            InputSource::Raw(text) => {
                if text.trim().is_empty() {
                    return DetectionResult::empty_input();
                }
                classify_content(text, false)
            }
        }
    }

    fn detect_file(&self, path: &Path) -> DetectionResult {
        let shown = path.display();

        if !path.exists() {
            return DetectionResult::failed(
                DocumentFormat::ErrorFileNotFound,
                Diagnostic::new(DiagnosticKind::FileNotFound, format!("File not found: {}", shown)),
            );
        }

        if has_pdf_extension(path) {
            return self.detect_pdf(path);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %shown, error = %e, "Could not read input file");
                return DetectionResult::failed(
                    DocumentFormat::ErrorFileRead,
                    Diagnostic::new(
                        DiagnosticKind::FileRead,
                        format!("Error reading content from file {}: {}", shown, e),
                    ),
                );
            }
        };

        if content.trim().is_empty() {
            return DetectionResult::with_diagnostic(
                DocumentFormat::TextFile,
                "",
                Diagnostic::new(
                    DiagnosticKind::EmptyFile,
                    format!("Empty text content from non-PDF file: {}", shown),
                ),
            );
        }

        classify_content(&content, true)
    }

    fn detect_pdf(&self, path: &Path) -> DetectionResult {
        let shown = path.display();
        let parsing_failed = |message: String| {
            DetectionResult::failed(
                DocumentFormat::ErrorPdfParsing,
                Diagnostic::new(DiagnosticKind::PdfParsing, message),
            )
        };

        let extracted = panic::catch_unwind(AssertUnwindSafe(|| self.pdf.extract_text(path)));

        match extracted {
            Ok(Ok(Some(pdf))) if pdf.is_partial() => {
                warn!(path = %shown, pages = ?pdf.unreadable_pages, "PDF only partially parsed");
                let message = format!(
                    "Partial PDF parse for {}: unreadable pages {:?}",
                    shown, pdf.unreadable_pages
                );
                DetectionResult::with_diagnostic(
                    DocumentFormat::Pdf,
                    pdf.text,
                    Diagnostic::new(DiagnosticKind::PdfParsing, message),
                )
            }
            Ok(Ok(Some(pdf))) => {
                debug!(path = %shown, chars = pdf.text.chars().count(), "PDF text extracted");
                DetectionResult::detected(DocumentFormat::Pdf, pdf.text)
            }
            Ok(Ok(None)) => parsing_failed(format!(
                "Critical error parsing PDF (parser returned None): {}",
                shown
            )),
            Ok(Err(e)) => {
                warn!(path = %shown, error = %e, "PDF extraction failed");
                parsing_failed(format!("Error during PDF processing for {}: {}", shown, e))
            }
            Err(_) => {
                warn!(path = %shown, "PDF parser panicked");
                parsing_failed(format!(
                    "Error during PDF processing for {}: parser panicked",
                    shown
                ))
            }
        }
    }
}

fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Content checks shared by files and raw strings; `content` is non-blank
fn classify_content(content: &str, from_file: bool) -> DetectionResult {
    let stripped = content.trim();

    if looks_like_json(stripped) && parse_json(stripped).is_ok() {
        return DetectionResult::detected(DocumentFormat::Json, stripped);
    }

    if looks_like_email(content) {
        return DetectionResult::detected(DocumentFormat::Email, content);
    }

    let format = if from_file {
        DocumentFormat::TextFile
    } else {
        DocumentFormat::Text
    };
    DetectionResult::detected(format, content)
}

fn looks_like_json(stripped: &str) -> bool {
    (stripped.starts_with('{') && stripped.ends_with('}'))
        || (stripped.starts_with('[') && stripped.ends_with(']'))
}

fn looks_like_email(content: &str) -> bool {
    let lower = content.to_lowercase();
    lower.contains("from:")
        && EMAIL_COMPANION_HEADERS
            .iter()
            .any(|header| lower.contains(header))
}
