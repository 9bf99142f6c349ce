//! Intent classification prompt

use crate::extractors::truncate_chars;
use intake_domain::Intent;

const INTENT_DEFINITIONS: &str = r#"- "Invoice": Documents related to billing, payment requests, or financial statements requiring payment.
- "RFQ" (Request for Quotation): Communications seeking pricing, proposals for goods/services, or vendor quotes.
- "Complaint": Expressions of dissatisfaction, problems, issues, or grievances regarding products or services.
- "Regulation": Official rules, legal documents, compliance requirements, terms and conditions, or policy statements.
- "Other": If the text does not clearly fit any of the above categories, is too generic, or if the text is very short and lacks clear business context."#;

const OUTPUT_FORMAT: &str = r#"Your response MUST be a valid JSON object with a single key "intent" and the classified intent as its string value.
Example: {"intent": "Invoice"}"#;

/// Builds the prompt sent to the intent oracle
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_chars: usize,
}

impl PromptBuilder {
    /// Create a builder that keeps at most `max_chars` characters of the text
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Build the complete classification prompt
    pub fn build(&self, text: &str) -> String {
        let intents: Vec<&str> = Intent::ALL.iter().map(|intent| intent.as_str()).collect();

        let mut prompt = String::new();
        prompt.push_str("Analyze the following text to determine its primary business intent.\n");
        prompt.push_str(&format!("Choose one intent from this list: {}.\n", intents.join(", ")));
        prompt.push_str(INTENT_DEFINITIONS);
        prompt.push_str("\n\n");
        prompt.push_str(OUTPUT_FORMAT);
        prompt.push_str("\n\nText to analyze:\n---\n");
        prompt.push_str(truncate_chars(text, self.max_chars));
        prompt.push_str("\n---\nRespond now with ONLY the JSON object.\n");
        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(8000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_intent() {
        let prompt = PromptBuilder::default().build("Please pay invoice 12");
        for intent in Intent::ALL {
            assert!(prompt.contains(&format!("\"{}\"", intent.as_str())));
        }
        assert!(prompt.contains(r#"{"intent": "Invoice"}"#));
        assert!(prompt.contains("---\nPlease pay invoice 12\n---"));
    }

    #[test]
    fn test_prompt_truncates_text() {
        let text = format!("{}TAIL", "x".repeat(100));
        let prompt = PromptBuilder::new(100).build(&text);
        assert!(prompt.contains(&"x".repeat(100)));
        assert!(!prompt.contains("TAIL"));
    }
}
