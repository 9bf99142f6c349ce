//! Snippet outputs for PDF and plain-text content

use super::{truncate_chars, Extraction};

/// Placeholder emitted when the PDF text layer could not be fully decoded
pub const PDF_PARSING_FAILED: &str = "PDF PARSING FAILED.";

const PDF_KEY: &str = "extracted_pdf_text_snippet";
const TEXT_KEY: &str = "text_content_snippet";

/// `{"extracted_pdf_text_snippet": ...}` from extracted PDF text
pub fn pdf_snippet(text: &str, max_chars: usize) -> Extraction {
    if text.is_empty() {
        return Extraction::single(PDF_KEY, "No text extracted or PDF empty.");
    }
    Extraction::single(PDF_KEY, truncate_chars(text, max_chars))
}

/// `{"extracted_pdf_text_snippet": "PDF PARSING FAILED."}`
pub fn pdf_parsing_failed() -> Extraction {
    Extraction::single(PDF_KEY, PDF_PARSING_FAILED)
}

/// `{"text_content_snippet": ...}` from plain text
pub fn text_snippet(text: &str, max_chars: usize) -> Extraction {
    if text.is_empty() {
        return Extraction::single(TEXT_KEY, "No text content.");
    }
    Extraction::single(TEXT_KEY, truncate_chars(text, max_chars))
}
