//! Invocation context of event-triggered functions
//!
//! Background functions receive their event metadata either in the request body
//! (`{"context": {...}, "data": ...}`, or the older form with the metadata fields
//! at the top level) or, for CloudEvents in binary mode, in `ce-*` headers.

use http::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The resource that emitted an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EventResource {
    /// Just a resource name, as sent by older event sources
    Name(String),
    /// Fully described resource
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        service: Option<String>,
        name: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        resource_type: Option<String>,
    },
}

impl EventResource {
    pub fn name(&self) -> &str {
        match self {
            EventResource::Name(name) => name,
            EventResource::Detailed { name, .. } => name,
        }
    }
}

/// Metadata describing the event that triggered an invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    #[serde(default)]
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<EventResource>,
}

impl EventMetadata {
    pub fn new(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            ..Default::default()
        }
    }
}

/// Everything known about the current invocation beyond its payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InvocationContext {
    metadata: Option<EventMetadata>,
}

impl InvocationContext {
    /// A context without event metadata.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn metadata(&self) -> Option<&EventMetadata> {
        self.metadata.as_ref()
    }

    /// Extracts event metadata from a background function request body.
    ///
    /// A body that is valid JSON but carries no metadata yields a context
    /// without metadata.
    pub fn from_event_body(body: &[u8]) -> Result<Self, serde_json::Error> {
        let mut body: Value = serde_json::from_slice(body)?;
        let metadata = if let Some(context) = body.get_mut("context").filter(|c| c.is_object()) {
            Some(serde_json::from_value(context.take())?)
        } else if body.get("eventId").is_some() {
            Some(serde_json::from_value(body)?)
        } else {
            None
        };
        Ok(Self { metadata })
    }

    /// Extracts event metadata from binary-mode CloudEvents headers.
    ///
    /// Without a `ce-id` header there is no metadata.
    pub fn from_cloud_event_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        let metadata = header("ce-id").map(|event_id| EventMetadata {
            event_id,
            timestamp: header("ce-time"),
            event_type: header("ce-type"),
            resource: header("ce-source").map(EventResource::Name),
        });
        Self { metadata }
    }
}
