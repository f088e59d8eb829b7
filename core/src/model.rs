//! Result model for the scoring endpoint.
//!
//! # Design
//! The service response is an open JSON object, but only five fields are
//! read from it. `Score` stores exactly those, each as `Option<Value>` so a
//! missing or `null` field is simply `None`. Dynamic lookups go through
//! `Score::get`, which rejects any name outside the declared set.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::UnknownAttribute;

/// Names accepted by `Score::get`.
pub const SCORE_ATTRIBUTES: [&str; 5] = [
    "timestamp",
    "label",
    "highlights",
    "success",
    "unfraud_score",
];

/// Decoded response of a scoring call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Score {
    timestamp: Option<Value>,
    label: Option<Value>,
    highlights: Option<Value>,
    success: Option<Value>,
    unfraud_score: Option<Value>,
}

impl Score {
    /// Extracts the recognized fields. Never fails; absent fields are `None`.
    pub fn from_response(response: &Map<String, Value>) -> Self {
        let lookup = |key: &str| response.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            timestamp: lookup("timestamp"),
            label: lookup("unfraud_label"),
            highlights: lookup("unfraud_highlights"),
            success: lookup("success"),
            unfraud_score: lookup("unfraud_score"),
        }
    }

    /// Looks up a field by name.
    ///
    /// # Errors
    /// `UnknownAttribute` when `name` is not one of [`SCORE_ATTRIBUTES`].
    pub fn get(&self, name: &str) -> Result<Option<&Value>, UnknownAttribute> {
        let field = match name {
            "timestamp" => &self.timestamp,
            "label" => &self.label,
            "highlights" => &self.highlights,
            "success" => &self.success,
            "unfraud_score" => &self.unfraud_score,
            _ => {
                return Err(UnknownAttribute {
                    name: name.to_string(),
                })
            }
        };
        Ok(field.as_ref())
    }

    pub fn timestamp(&self) -> Option<&Value> {
        self.timestamp.as_ref()
    }

    /// Classification label, e.g. `"safe"` or `"fraud"`.
    pub fn label(&self) -> Option<&str> {
        self.label.as_ref().and_then(Value::as_str)
    }

    pub fn highlights(&self) -> Option<&Value> {
        self.highlights.as_ref()
    }

    pub fn success(&self) -> Option<bool> {
        self.success.as_ref().and_then(Value::as_bool)
    }

    /// Numeric fraud score (`unfraud_score`).
    pub fn risk_score(&self) -> Option<f64> {
        self.unfraud_score.as_ref().and_then(Value::as_f64)
    }
}
