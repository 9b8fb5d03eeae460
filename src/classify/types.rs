//! Classifier types
//!
//! Decoded payloads and the shape of API error bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A successfully decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body declared as JSON and parsed as such
    Json(Value),
    /// Anything else, kept as text
    Text(String),
    /// 204, nothing to decode
    NoContent,
}

impl Payload {
    /// The payload as a raw value for error reporting
    pub(crate) fn into_raw_value(self) -> Option<Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Text(text) if !text.is_empty() => Some(Value::String(text)),
            _ => None,
        }
    }
}

/// Error body returned by the API
///
/// ```json
/// { "statusCode": 404, "body": { "status": "NOT_FOUND", "message": "..." } }
/// ```
///
/// Only `body.message` is interpreted. The echoed status fields are kept as
/// raw values since servers are not consistent about their types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Status code echoed by the server
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<Value>,

    /// Error details
    #[serde(default)]
    pub body: Option<ErrorDetail>,
}

/// Inner part of an [`ErrorBody`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable status, e.g. `NOT_FOUND`
    #[serde(default)]
    pub status: Option<Value>,

    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Read an error body out of a decoded value, if it has that shape
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }

    /// The server's message, if any; blank messages count as missing
    pub fn message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .message
            .as_deref()
            .filter(|msg| !msg.trim().is_empty())
    }
}
