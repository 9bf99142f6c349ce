//! PDF text layer extraction
//!
//! `pdf-extract` handles the common case. When it fails (or panics, which it
//! does on some malformed fonts) the document is reopened with `lopdf` and
//! decoded page by page, so a few bad pages do not lose the whole text.

use crate::error::PipelineError;
use intake_domain::traits::PdfTextSource;
use intake_domain::PdfText;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use tracing::{debug, warn};

/// Default `PdfTextSource` backed by `pdf-extract` and `lopdf`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractSource;

impl PdfExtractSource {
    /// Extract text from PDF bytes
    pub fn extract_from_bytes(&self, bytes: &[u8]) -> Result<PdfText, PipelineError> {
        let primary = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
        }));

        match primary {
            Ok(Ok(pages)) => return Ok(PdfText::complete(pages.concat())),
            Ok(Err(e)) => warn!(error = %e, "pdf-extract failed, trying page-by-page fallback"),
            Err(_) => warn!("pdf-extract panicked, trying page-by-page fallback"),
        }

        extract_by_page(bytes)
    }
}

impl PdfTextSource for PdfExtractSource {
    type Error = PipelineError;

    fn extract_text(&self, path: &Path) -> Result<Option<PdfText>, Self::Error> {
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        let document = lopdf::Document::load_mem(&bytes)?;
        if document.is_encrypted() {
            return Err(PipelineError::Pdf("document is password protected".to_string()));
        }

        self.extract_from_bytes(&bytes).map(Some)
    }
}

fn extract_by_page(bytes: &[u8]) -> Result<PdfText, PipelineError> {
    let document = lopdf::Document::load_mem(bytes)?;
    let pages = document.get_pages();
    if pages.is_empty() {
        return Err(PipelineError::Pdf("document has no pages".to_string()));
    }

    let mut text = String::new();
    let mut unreadable_pages = Vec::new();

    for page_number in pages.keys().copied() {
        match document.extract_text(&[page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => {
                debug!(page = page_number, error = %e, "Page text unreadable");
                unreadable_pages.push(page_number);
            }
        }
    }

    if unreadable_pages.len() == pages.len() {
        return Err(PipelineError::Pdf(format!(
            "no readable text on any of {} pages",
            pages.len()
        )));
    }

    Ok(PdfText {
        text,
        unreadable_pages,
    })
}
