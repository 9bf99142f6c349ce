//! Classification orchestrator
//!
//! Runs one input through detection, intent classification and extraction,
//! logging each stage under a fresh conversation id. `process` is total: every
//! failure, panics inside extractors included, ends up in the returned
//! `ProcessResult`.

use crate::classifier::IntentClassifier;
use crate::config::PipelineConfig;
use crate::detector::FormatDetector;
use crate::error::PipelineError;
use crate::extractors::{
    parse_json, pdf_parsing_failed, pdf_snippet, text_snippet, truncate_chars, EmailExtractor,
    Extraction, JsonExtractor,
};
use intake_domain::traits::{ConversationLog, LlmProvider, PdfTextSource};
use intake_domain::{
    ConversationId, DetectionResult, DocumentFormat, InputSource, IntentFailure, IntentOutcome,
    LogEvent, ProcessResult, ProcessStatus, Stage,
};
use serde_json::{json, Map};
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

const FAILED_FORMAT_DETERMINATION: &str = "FAILED_FORMAT_DETERMINATION";

/// Where the routing step ended up
struct Routed {
    status: ProcessStatus,
    extraction: Extraction,
    error_message: Option<String>,
}

impl Routed {
    fn processed(extraction: Extraction) -> Self {
        Self {
            status: ProcessStatus::Processed,
            extraction,
            error_message: None,
        }
    }

    fn failed(status: ProcessStatus, extraction: Extraction, message: String) -> Self {
        Self {
            status,
            extraction,
            error_message: Some(message),
        }
    }
}

/// Routes inputs through detection, classification and extraction
pub struct Orchestrator<L, G, P> {
    detector: FormatDetector<P>,
    classifier: IntentClassifier<L>,
    log: G,
    json: JsonExtractor,
    email: EmailExtractor,
    config: PipelineConfig,
}

impl<L, G, P> Orchestrator<L, G, P>
where
    L: LlmProvider,
    L::Error: Display,
    G: ConversationLog,
    P: PdfTextSource,
    P::Error: Display,
{
    /// Create a new Orchestrator
    pub fn new(classifier: IntentClassifier<L>, log: G, pdf: P, config: PipelineConfig) -> Self {
        Self {
            detector: FormatDetector::new(pdf),
            classifier,
            log,
            json: JsonExtractor::new(config.schema.clone()),
            email: EmailExtractor::new(config.urgency_window_chars),
            config,
        }
    }

    /// The conversation log events are written to
    pub fn log(&self) -> &G {
        &self.log
    }

    /// The intent classifier in use
    pub fn classifier(&self) -> &IntentClassifier<L> {
        &self.classifier
    }

    /// Process one input end to end
    pub fn process(&self, input: InputSource) -> ProcessResult {
        let conversation_id = ConversationId::new();
        info!(
            conversation_id = %conversation_id,
            source = input.source_type(),
            "Processing request"
        );

        self.log.append(
            &conversation_id,
            LogEvent::new(
                Stage::RequestReceived,
                "RECEIVED",
                json!({
                    "input_source_type": input.source_type(),
                    "input_identifier": self.identifier(&input),
                    "conversation_id": conversation_id,
                }),
            ),
        );

        let detection = self.detector.detect(&input);
        if detection.format.is_error() {
            return self.detection_failed(conversation_id, detection);
        }

        info!(conversation_id = %conversation_id, format = %detection.format, "Format determined");
        self.log.append(
            &conversation_id,
            LogEvent::new(
                Stage::FormatDetermined,
                detection.format.as_str(),
                json!({
                    "determined_format": detection.format,
                    "diagnostic": detection.diagnostic,
                }),
            ),
        );

        let intent = self.determine_intent(&detection);
        info!(conversation_id = %conversation_id, intent = %intent, "Intent determined");
        self.log.append(
            &conversation_id,
            LogEvent::new(
                Stage::IntentDetermined,
                intent.as_str(),
                json!({
                    "determined_format": detection.format,
                    "determined_intent": intent,
                }),
            ),
        );

        let routed = self.route(&detection, &intent);
        if routed.status.is_success() {
            info!(conversation_id = %conversation_id, status = %routed.status, "Processing complete");
        } else {
            warn!(
                conversation_id = %conversation_id,
                status = %routed.status,
                error = routed.error_message.as_deref().unwrap_or(""),
                "Processing finished with failure"
            );
        }

        self.log.append(
            &conversation_id,
            LogEvent::new(
                Stage::ProcessingResult,
                routed.status.to_string(),
                json!({
                    "source_input_type": detection.format,
                    "intent": intent,
                    "extracted_values": routed.extraction.output,
                    "anomalies": routed.extraction.anomalies,
                    "error_message": routed.error_message,
                }),
            ),
        );

        ProcessResult {
            status: routed.status,
            format: detection.format,
            intent: Some(intent),
            output: routed.extraction.output,
            anomalies: routed.extraction.anomalies,
            conversation_id,
            message: routed.error_message,
        }
    }

    fn identifier(&self, input: &InputSource) -> String {
        match input {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Raw(text) => {
                format!("{}...", truncate_chars(text, self.config.preview_chars))
            }
        }
    }

    fn detection_failed(
        &self,
        conversation_id: ConversationId,
        detection: DetectionResult,
    ) -> ProcessResult {
        let message = detection.diagnostic_message().unwrap_or_default().to_string();
        warn!(
            conversation_id = %conversation_id,
            format = %detection.format,
            error = %message,
            "Format determination failed"
        );

        self.log.append(
            &conversation_id,
            LogEvent::new(
                Stage::FormatDeterminationFailed,
                FAILED_FORMAT_DETERMINATION,
                json!({
                    "determined_format": detection.format,
                    "error": message,
                }),
            ),
        );

        ProcessResult {
            status: ProcessStatus::Error,
            format: detection.format,
            intent: None,
            output: Map::new(),
            anomalies: Vec::new(),
            conversation_id,
            message: Some(message),
        }
    }

    fn determine_intent(&self, detection: &DetectionResult) -> IntentOutcome {
        if detection.format == DocumentFormat::UnknownEmptyInput {
            return IntentFailure::EmptyInput.into();
        }
        if detection.content.trim().is_empty() {
            return IntentFailure::EmptyContent.into();
        }
        self.classifier.classify(&detection.content)
    }

    fn route(&self, detection: &DetectionResult, intent: &IntentOutcome) -> Routed {
        let content = detection.content.as_str();

        if detection.has_pdf_parsing_failure() {
            return Routed::failed(
                ProcessStatus::PdfParsing,
                pdf_parsing_failed(),
                detection.diagnostic_message().unwrap_or_default().to_string(),
            );
        }

        if let IntentOutcome::Failed(failure) = intent {
            let snippet = if content.is_empty() {
                "N/A"
            } else {
                truncate_chars(content, self.config.diagnostic_snippet_chars)
            };
            return Routed::failed(
                ProcessStatus::IntentFailed(failure.clone()),
                Extraction::single("text_snippet", snippet),
                format!(
                    "Intent classification issue or problematic content/setup: {}",
                    failure
                ),
            );
        }

        match detection.format {
            DocumentFormat::Json => self.route_json(content),
            DocumentFormat::Email => self.guarded(DocumentFormat::Email, content, || {
                Ok(self.email.extract(content))
            }),
            DocumentFormat::Pdf => Routed::processed(pdf_snippet(content, self.config.snippet_chars)),
            DocumentFormat::TextFile | DocumentFormat::Text => {
                Routed::processed(text_snippet(content, self.config.snippet_chars))
            }
            other => Routed::failed(
                ProcessStatus::ProcessingUnexpected(other),
                Extraction::single("raw_content_snippet", self.raw_snippet(content)),
                format!("Cannot route, unhandled format: {}", other),
            ),
        }
    }

    fn route_json(&self, content: &str) -> Routed {
        let payload = match parse_json(content) {
            Ok(payload) => payload,
            Err(e) => {
                let mut extraction = Extraction::single("raw_json_string_snippet", self.raw_snippet(content));
                extraction
                    .anomalies
                    .push(format!("Invalid JSON structure for agent: {}", e));
                return Routed::failed(
                    ProcessStatus::JsonProcessing,
                    extraction,
                    format!("Invalid JSON for JSON extractor: {}", e),
                );
            }
        };

        self.guarded(DocumentFormat::Json, content, || self.json.process(&payload))
    }

    /// Run an extractor, turning errors and panics into an unexpected-processing failure
    fn guarded<F>(&self, format: DocumentFormat, content: &str, extract: F) -> Routed
    where
        F: FnOnce() -> Result<Extraction, PipelineError>,
    {
        let error = match panic::catch_unwind(AssertUnwindSafe(extract)) {
            Ok(Ok(extraction)) => return Routed::processed(extraction),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "extractor panicked".to_string(),
        };

        let key = match format {
            DocumentFormat::Email => "raw_email_string_snippet",
            _ => "raw_json_string_snippet",
        };
        Routed::failed(
            ProcessStatus::ProcessingUnexpected(format),
            Extraction::single(key, self.raw_snippet(content)),
            format!(
                "Unexpected error in {} extractor: {}",
                format.processing_label(),
                error
            ),
        )
    }

    fn raw_snippet<'a>(&self, content: &'a str) -> &'a str {
        truncate_chars(content, self.config.diagnostic_snippet_chars)
    }
}
