use std::collections::BTreeMap;

use serde::Serialize;
use time::OffsetDateTime;

use crate::{MonitoredResource, Severity, encoding::Payload};

/// Where in the source code an entry was emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Source file name
    pub file: String,
    /// Line within the file, 1-based
    pub line: u32,
    /// Function or module that emitted the entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// A single Cloud Logging entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    /// Severity of the entry
    pub severity: Severity,
    /// When the entry was created
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Monitored resource the entry belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<MonitoredResource>,
    /// User-defined labels
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Trace resource name, `projects/{project}/traces/{trace_id}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<String>,
    /// Span within the trace
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span_id: Option<String>,
    /// Whether the trace was sampled
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub trace_sampled: bool,
    /// Source code location of the call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
    /// Entry body
    #[serde(flatten)]
    pub payload: Payload,
}

impl LogEntry {
    /// Creates an entry timestamped now.
    pub fn new(severity: Severity, payload: Payload) -> Self {
        Self {
            severity,
            timestamp: OffsetDateTime::now_utc(),
            resource: None,
            labels: BTreeMap::new(),
            trace: None,
            span_id: None,
            trace_sampled: false,
            source_location: None,
            payload,
        }
    }

    /// Sets the monitored resource.
    pub fn with_resource(mut self, resource: MonitoredResource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// Adds labels, replacing any existing label with the same key.
    pub fn with_labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Associates the entry with a trace and, optionally, a span.
    pub fn with_trace(
        mut self,
        trace: impl Into<String>,
        span_id: Option<String>,
        sampled: bool,
    ) -> Self {
        self.trace = Some(trace.into());
        self.span_id = span_id;
        self.trace_sampled = sampled;
        self
    }

    /// Records where the entry was emitted.
    pub fn with_source_location(mut self, location: SourceLocation) -> Self {
        self.source_location = Some(location);
        self
    }

    /// Overrides the creation time.
    pub fn with_timestamp(mut self, timestamp: OffsetDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Body of an `entries:write` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteEntriesRequest {
    /// Full log name, `projects/{project}/logs/{log_id}`
    pub log_name: String,
    /// Entries to write
    pub entries: Vec<LogEntry>,
    /// Whether valid entries are written when some are rejected
    pub partial_success: bool,
}
