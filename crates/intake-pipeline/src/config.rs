//! Configuration for the pipeline

use crate::error::PipelineError;
use crate::extractors::JsonSchema;
use serde::{Deserialize, Serialize};

/// Configuration for the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Maximum characters of content sent to the intent oracle
    pub max_prompt_chars: usize,

    /// Length of PDF and text snippets in the output (characters)
    pub snippet_chars: usize,

    /// Length of raw-content snippets attached to failures (characters)
    pub diagnostic_snippet_chars: usize,

    /// Length of the raw-string identifier logged with a request (characters)
    pub preview_chars: usize,

    /// How much of an email body is scanned for urgency keywords (characters)
    pub urgency_window_chars: usize,

    /// Fields checked by the JSON extractor
    pub schema: JsonSchema,
}

impl PipelineConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), PipelineError> {
        let positive = [
            ("max_prompt_chars", self.max_prompt_chars),
            ("snippet_chars", self.snippet_chars),
            ("diagnostic_snippet_chars", self.diagnostic_snippet_chars),
            ("preview_chars", self.preview_chars),
            ("urgency_window_chars", self.urgency_window_chars),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(PipelineError::Config(format!("{} must be greater than 0", name)));
        }

        self.schema.validate()
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, PipelineError> {
        toml::from_str(toml_str)
            .map_err(|e| PipelineError::Config(format!("Failed to parse TOML: {}", e)))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, PipelineError> {
        toml::to_string_pretty(self)
            .map_err(|e| PipelineError::Config(format!("Failed to serialize to TOML: {}", e)))
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_prompt_chars: 8000,
            snippet_chars: 500,
            diagnostic_snippet_chars: 200,
            preview_chars: 100,
            urgency_window_chars: 500,
            schema: JsonSchema::default(),
        }
    }
}
