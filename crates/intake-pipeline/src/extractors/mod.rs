//! Format-specific extractors
//!
//! Each extractor turns the analyzable content of one format into an output
//! map plus a list of anomalies. Extractors are pure: no I/O, no logging of
//! their own beyond `debug!`.

mod email;
mod json;
mod snippet;

pub use email::{EmailExtractor, EmailFields, URGENCY_KEYWORDS};
pub use json::{FieldSpec, JsonExtractor, JsonSchema};
pub(crate) use json::parse_json;
pub use snippet::{pdf_parsing_failed, pdf_snippet, text_snippet, PDF_PARSING_FAILED};

use serde_json::{Map, Value};

/// Output of an extractor
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Extracted field values
    pub output: Map<String, Value>,

    /// Non-fatal data-quality findings, never null
    pub anomalies: Vec<String>,
}

impl Extraction {
    /// An extraction without anomalies
    pub fn clean(output: Map<String, Value>) -> Self {
        Self {
            output,
            anomalies: Vec::new(),
        }
    }

    /// A single-key output without anomalies
    pub fn single(key: &str, value: impl Into<Value>) -> Self {
        let mut output = Map::new();
        output.insert(key.to_string(), value.into());
        Self::clean(output)
    }
}

/// First `max_chars` characters of `text`
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 50), "short");
        assert_eq!(truncate_chars("", 3), "");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_single() {
        let extraction = Extraction::single("k", "v");
        assert_eq!(extraction.output["k"], "v");
        assert!(extraction.anomalies.is_empty());
    }
}
