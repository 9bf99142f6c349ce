//! Parse oracle output into an intent

use intake_domain::{Intent, IntentFailure};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::warn;

static INTENT_OBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{\s*"intent"\s*:\s*"[^"]+"\s*\}"#).expect("intent pattern is valid")
});

/// Parse the oracle's text answer into an intent
///
/// Values outside the closed set are coerced to `Intent::Other`.
pub fn parse_intent_response(response: &str) -> Result<Intent, IntentFailure> {
    let cleaned = strip_code_fence(response);

    let json: Value = match serde_json::from_str(cleaned) {
        Ok(json) => json,
        Err(e) => match INTENT_OBJECT_RE.find(cleaned) {
            Some(m) => serde_json::from_str(m.as_str()).map_err(|e| {
                warn!(error = %e, response = cleaned, "Embedded intent object is not valid JSON");
                IntentFailure::ParsingResponse
            })?,
            None => {
                warn!(error = %e, response = cleaned, "No JSON found in oracle response");
                return Err(IntentFailure::ParsingResponse);
            }
        },
    };

    let intent = json
        .as_object()
        .and_then(|obj| obj.get("intent"))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty());

    match intent {
        Some(value) => {
            let coerced = Intent::coerce(value);
            if coerced.as_str() != value {
                warn!(value, "Oracle returned an unexpected intent, defaulting to Other");
            }
            Ok(coerced)
        }
        None => {
            warn!(response = cleaned, "Oracle JSON has no usable 'intent' value");
            Err(IntentFailure::MalformedResponse)
        }
    }
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    inner.strip_suffix("```").unwrap_or(inner).trim()
}
