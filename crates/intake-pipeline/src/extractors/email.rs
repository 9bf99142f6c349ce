//! Header and body extraction for email text

use super::{truncate_chars, Extraction};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::LazyLock;

static SENDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)from:[ \t]*(.*)").expect("sender pattern is valid"));

static SUBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)subject:[ \t]*(.*)").expect("subject pattern is valid"));

/// Words that mark an email as urgent (matched as lowercase substrings)
pub const URGENCY_KEYWORDS: [&str; 5] = ["urgent", "asap", "immediately", "important", "critical"];

/// Fields pulled out of an email
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailFields {
    /// Value of the first `From:` header, trimmed
    pub sender: Option<String>,

    /// Value of the first `Subject:` header, trimmed
    pub subject: Option<String>,

    /// Message body, trimmed
    pub body: String,

    /// Whether an urgency keyword appears in the subject or body opening
    pub urgency: bool,
}

/// Extracts sender, subject, body and urgency from raw email text
#[derive(Debug, Clone)]
pub struct EmailExtractor {
    urgency_window_chars: usize,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new(500)
    }
}

impl EmailExtractor {
    /// Create an extractor scanning the first `urgency_window_chars` of the body
    pub fn new(urgency_window_chars: usize) -> Self {
        Self {
            urgency_window_chars,
        }
    }

    /// Parse an email into its fields
    pub fn parse(&self, raw: &str) -> EmailFields {
        let sender = header_value(&SENDER_RE, raw);
        let subject = header_value(&SUBJECT_RE, raw);
        let body = body_of(raw);

        let haystack = format!(
            "{} {}",
            subject.as_deref().unwrap_or(""),
            truncate_chars(&body, self.urgency_window_chars)
        )
        .to_lowercase();
        let urgency = URGENCY_KEYWORDS.iter().any(|word| haystack.contains(word));

        EmailFields {
            sender,
            subject,
            body,
            urgency,
        }
    }

    /// Parse an email into an output map with keys `sender`, `subject`, `body`, `urgency`
    pub fn extract(&self, raw: &str) -> Extraction {
        let fields = self.parse(raw);

        let mut output = Map::new();
        output.insert("sender".to_string(), fields.sender.map_or(Value::Null, Value::String));
        output.insert("subject".to_string(), fields.subject.map_or(Value::Null, Value::String));
        output.insert("body".to_string(), Value::String(fields.body));
        output.insert("urgency".to_string(), Value::Bool(fields.urgency));

        Extraction::clean(output)
    }
}

fn header_value(pattern: &Regex, raw: &str) -> Option<String> {
    pattern
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Body starts after the first blank line; failing that, after the first
/// `subject:` line; failing that, at the top.
fn body_of(raw: &str) -> String {
    let lines: Vec<&str> = raw.lines().collect();

    let after_blank = lines
        .iter()
        .enumerate()
        .find(|(i, line)| line.trim().is_empty() && i + 1 < lines.len())
        .map(|(i, _)| i + 1);

    let start = after_blank.unwrap_or_else(|| {
        lines
            .iter()
            .position(|line| line.to_lowercase().contains("subject:"))
            .filter(|i| i + 1 < lines.len())
            .map_or(0, |i| i + 1)
    });

    lines[start.min(lines.len())..].join("\n").trim().to_string()
}
