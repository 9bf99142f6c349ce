//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use intake_domain::{ConversationId, ProcessResult};
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format a processing result.
    pub fn format_result(&self, result: &ProcessResult) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
            OutputFormat::Table => Ok(self.format_result_table(result)),
            OutputFormat::Quiet => Ok(result.conversation_id.to_string()),
        }
    }

    fn format_result_table(&self, result: &ProcessResult) -> String {
        let intent = result
            .intent
            .as_ref()
            .map_or_else(|| "N/A".to_string(), |intent| intent.to_string());
        let status = result.status.to_string();
        let status = if result.status.is_success() {
            self.colorize(&status, "green")
        } else {
            self.colorize(&status, "red")
        };

        let mut builder = Builder::default();
        builder.push_record(["Status".to_string(), status]);
        builder.push_record(["Format".to_string(), result.format.to_string()]);
        builder.push_record(["Intent".to_string(), intent]);
        builder.push_record(["Conversation ID".to_string(), result.conversation_id.to_string()]);
        if !result.anomalies.is_empty() {
            builder.push_record(["Anomalies".to_string(), result.anomalies.join("\n")]);
        }
        if let Some(message) = &result.message {
            builder.push_record(["Message".to_string(), message.clone()]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::right()));

        format!("{}\n{}", table, self.log_hint(&result.conversation_id))
    }

    /// Pointer to the stored conversation history.
    pub fn log_hint(&self, conversation_id: &ConversationId) -> String {
        self.info(&format!(
            "Full processing log stored under key {}",
            conversation_id.storage_key()
        ))
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            _ => text.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intake_domain::{DocumentFormat, Intent, IntentOutcome, ProcessStatus};
    use serde_json::Map;

    fn create_test_result() -> ProcessResult {
        ProcessResult {
            status: ProcessStatus::Processed,
            format: DocumentFormat::Json,
            intent: Some(IntentOutcome::Classified(Intent::Invoice)),
            output: Map::new(),
            anomalies: vec!["Missing field: vendor".to_string()],
            conversation_id: ConversationId::new(),
            message: None,
        }
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let result = create_test_result();
        let output = formatter.format_result(&result).unwrap();

        assert!(output.contains("Processed"));
        assert!(output.contains("JSON"));
        assert!(output.contains("Invoice"));
        assert!(output.contains("Missing field: vendor"));
        assert!(output.contains(&format!("conversation:{}", result.conversation_id)));
    }

    #[test]
    fn test_table_omits_empty_anomalies() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let mut result = create_test_result();
        result.anomalies.clear();
        result.intent = None;

        let output = formatter.format_result(&result).unwrap();
        assert!(!output.contains("Anomalies"));
        assert!(output.contains("N/A"));
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_result(&create_test_result()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["status"], "Processed");
        assert_eq!(value["intent"], "Invoice");
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let result = create_test_result();
        let output = formatter.format_result(&result).unwrap();
        assert_eq!(output, result.conversation_id.to_string());
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.info("test"), "ℹ test");
    }
}
