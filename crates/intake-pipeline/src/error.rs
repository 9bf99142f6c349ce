//! Error types for the pipeline

use thiserror::Error;

/// Errors raised inside pipeline stages
///
/// None of these escape `Orchestrator::process`; they are folded into the
/// returned `ProcessResult`.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Reading input from disk failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF could not be opened or decoded
    #[error("PDF error: {0}")]
    Pdf(String),

    /// Payload handed to an extractor has the wrong shape
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<lopdf::Error> for PipelineError {
    fn from(e: lopdf::Error) -> Self {
        PipelineError::Pdf(e.to_string())
    }
}
