//! Free-form payload fields (`rawRequest`, `settings`).
//!
//! Payloads are stored verbatim as text. On export they are rendered as raw
//! JSON, with blank text becoming `null`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied free-form payload kept as opaque text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPayload(String);

impl RawPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Renders the payload as a JSON value for export.
    ///
    /// - blank text -> `null`
    /// - valid JSON text -> that JSON value
    /// - anything else -> a JSON string holding the trimmed text
    pub fn to_json_value(&self) -> Value {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
    }
}

impl From<&str> for RawPayload {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RawPayload {
    fn from(value: String) -> Self {
        Self(value)
    }
}
