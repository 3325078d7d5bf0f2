//! Maps lookup service responses onto exposure verdicts.
//!
//! The service's response shape is not contractually fixed, so every field
//! is optional and decoding never fails on missing or odd-typed fields. Only
//! a body that is not a JSON object at all is rejected.

use crate::error::LookupError;
use breachcheck_core::{CandidateEmail, ExposureState, ReportEntry, SourceDescriptor};
use serde::Deserialize;
use serde_json::Value;

/// Structured view of a lookup response body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExposureResponse {
    /// Breach indicator: usually a count, sometimes a bool
    #[serde(default)]
    pub found: Option<Value>,
    /// Breach-source descriptors, expected to be a list
    #[serde(default)]
    pub sources: Option<Value>,
}

impl ExposureResponse {
    /// Decode a response body.
    ///
    /// # Errors
    /// Returns `LookupError::MalformedResponse` if the body is not a JSON object.
    pub fn from_json(body: &str) -> Result<Self, LookupError> {
        let value: Value =
            serde_json::from_str(body).map_err(|e| LookupError::MalformedResponse {
                detail: format!("response is not valid JSON: {e}"),
            })?;

        if !value.is_object() {
            return Err(LookupError::MalformedResponse {
                detail: format!("expected a JSON object, got {}", json_type(&value)),
            });
        }

        serde_json::from_value(value).map_err(|e| LookupError::MalformedResponse {
            detail: e.to_string(),
        })
    }
}

/// Classified result of a successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Exposure {
    pub exposed: bool,
    pub breach_count: u64,
    pub sources: Vec<SourceDescriptor>,
}

impl Exposure {
    #[must_use]
    pub fn state(&self) -> ExposureState {
        if self.exposed {
            ExposureState::Breached
        } else {
            ExposureState::Safe
        }
    }

    /// Build the report entry for `email`.
    #[must_use]
    pub fn into_entry(self, email: CandidateEmail) -> ReportEntry {
        if self.exposed {
            ReportEntry::breached(email, self.breach_count, self.sources)
        } else {
            ReportEntry::safe(email)
        }
    }
}

/// Classify a decoded response.
///
/// A falsy `found` is authoritative: the result is safe and any `sources`
/// the service sent anyway are dropped. Otherwise the count is the length
/// of `sources` when it is a list, else `found` read as an integer (`true`
/// counts as 1), else 0.
#[must_use]
pub fn classify(response: &ExposureResponse) -> Exposure {
    let found = response.found.as_ref().unwrap_or(&Value::Null);

    if is_falsy(found) {
        return Exposure {
            exposed: false,
            breach_count: 0,
            sources: Vec::new(),
        };
    }

    match &response.sources {
        Some(Value::Array(sources)) => Exposure {
            exposed: true,
            breach_count: sources.len() as u64,
            sources: sources.clone(),
        },
        _ => Exposure {
            exposed: true,
            breach_count: count_from_found(found),
            sources: Vec::new(),
        },
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn count_from_found(found: &Value) -> u64 {
    match found {
        Value::Number(n) => n.as_u64().unwrap_or(0),
        Value::Bool(true) => 1,
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
