//! Field-schema extraction for JSON payloads

use super::Extraction;
use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Strict JSON parse without a nesting limit
///
/// Deep documents are parsed on a growing stack instead of being rejected
/// at serde_json's default depth of 128.
pub(crate) fn parse_json(text: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// One field the JSON extractor looks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Top-level key in the payload
    pub name: String,

    /// Whether the field is expected on every document
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    /// A required field
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: true,
        }
    }

    /// An optional field
    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
        }
    }
}

/// Ordered list of fields checked by the JSON extractor
///
/// Every field is checked, required or optional; the flag is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonSchema(Vec<FieldSpec>);

impl JsonSchema {
    /// Create a schema from an ordered field list
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self(fields)
    }

    /// Schema from bare field names, all required
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(names.into_iter().map(FieldSpec::required).collect())
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.0
    }

    /// Reject empty or duplicate field names
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut seen = HashSet::new();
        for field in &self.0 {
            if field.name.trim().is_empty() {
                return Err(PipelineError::Config("schema field name cannot be empty".to_string()));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate schema field: {}",
                    field.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for JsonSchema {
    /// Invoice-oriented schema
    fn default() -> Self {
        Self(vec![
            FieldSpec::required("invoice_number"),
            FieldSpec::required("date"),
            FieldSpec::required("amount"),
            FieldSpec::required("vendor"),
            FieldSpec::optional("customer_name"),
            FieldSpec::optional("item_description"),
            FieldSpec::optional("complaint_details"),
        ])
    }
}

/// Copies schema fields out of a JSON object, flagging the missing ones
#[derive(Debug, Clone, Default)]
pub struct JsonExtractor {
    schema: JsonSchema,
}

impl JsonExtractor {
    /// Create an extractor for a schema
    pub fn new(schema: JsonSchema) -> Self {
        Self { schema }
    }

    /// Check `payload` against the schema
    ///
    /// Present fields are copied verbatim, absent ones become `null` with a
    /// `Missing field: <name>` anomaly. Extra payload keys are ignored.
    ///
    /// # Errors
    ///
    /// `PipelineError::InvalidPayload` if the payload is not a JSON object.
    pub fn process(&self, payload: &Value) -> Result<Extraction, PipelineError> {
        let object = payload.as_object().ok_or_else(|| {
            PipelineError::InvalidPayload(format!(
                "expected a JSON object, found {}",
                value_kind(payload)
            ))
        })?;

        let mut output = Map::new();
        let mut anomalies = Vec::new();

        for field in self.schema.fields() {
            match object.get(&field.name) {
                Some(value) => {
                    output.insert(field.name.clone(), value.clone());
                }
                None => {
                    anomalies.push(format!("Missing field: {}", field.name));
                    output.insert(field.name.clone(), Value::Null);
                }
            }
        }

        Ok(Extraction { output, anomalies })
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
