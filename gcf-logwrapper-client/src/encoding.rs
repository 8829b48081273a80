//! Encoding of log entry payloads
//!
//! Cloud Logging accepts either a text payload or a JSON object payload.
//! Anything implementing [`IntoPayload`] can be logged.

use std::convert::Infallible;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value};

/// The body of a log entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Sent as `textPayload`
    Text(String),
    /// Sent as `jsonPayload`
    Json(Map<String, Value>),
}

impl Payload {
    /// Converts a JSON value into a payload.
    ///
    /// Strings become text payloads and objects become JSON payloads. Any other
    /// value cannot be sent to Cloud Logging on its own.
    pub fn from_value(value: Value) -> Result<Self, PayloadError> {
        match value {
            Value::String(text) => Ok(Payload::Text(text)),
            Value::Object(map) => Ok(Payload::Json(map)),
            other => Err(PayloadError::NotAnObject {
                kind: value_kind(&other),
            }),
        }
    }

    /// The text of a text payload.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            Payload::Json(_) => None,
        }
    }

    /// The fields of a JSON payload.
    pub fn as_json(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Text(_) => None,
            Payload::Json(map) => Some(map),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

// A payload is flattened into its entry as exactly one of `textPayload` or `jsonPayload`.
impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Payload::Text(text) => map.serialize_entry("textPayload", text)?,
            Payload::Json(fields) => map.serialize_entry("jsonPayload", fields)?,
        }
        map.end()
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

/// A payload that could not be encoded.
#[derive(thiserror::Error, Debug)]
pub enum PayloadError {
    /// Serialization itself failed.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The payload serialized to something other than a string or an object.
    #[error("payload must serialize to a JSON object, got {kind}")]
    NotAnObject {
        /// What the payload serialized to
        kind: &'static str,
    },
}

impl From<Infallible> for PayloadError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Something that can be logged as an entry payload.
pub trait IntoPayload {
    /// The error type returned when encoding fails.
    type Error: Into<PayloadError>;
    /// Convert into a payload
    fn try_into_payload(self) -> Result<Payload, Self::Error>;
}

impl IntoPayload for Payload {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(self)
    }
}
impl IntoPayload for String {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(Payload::Text(self))
    }
}
impl IntoPayload for &str {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(Payload::Text(self.to_string()))
    }
}
impl IntoPayload for &String {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(Payload::Text(self.clone()))
    }
}
impl IntoPayload for std::fmt::Arguments<'_> {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(Payload::Text(self.to_string()))
    }
}
impl IntoPayload for Map<String, Value> {
    type Error = Infallible;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Ok(Payload::Json(self))
    }
}
impl IntoPayload for Value {
    type Error = PayloadError;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Payload::from_value(self)
    }
}

/// JSON encoding for any serializable type
///
/// ```rust
/// use gcf_logwrapper_client::encoding::{IntoPayload, Json};
///
/// #[derive(serde::Serialize)]
/// struct Order {
///     id: u64,
///     total_cents: u64,
/// }
///
/// let payload = Json(Order { id: 7, total_cents: 1250 }).try_into_payload().unwrap();
/// assert_eq!(payload.as_json().unwrap()["id"], 7);
/// ```
pub struct Json<T>(pub T);

impl<T: Serialize> IntoPayload for Json<T> {
    type Error = PayloadError;
    fn try_into_payload(self) -> Result<Payload, Self::Error> {
        Payload::from_value(serde_json::to_value(&self.0)?)
    }
}
