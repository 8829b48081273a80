use http::HeaderMap;

/// Header carrying the Cloud Trace context of an HTTP invocation
pub const TRACE_CONTEXT_HEADER: &str = "X-Cloud-Trace-Context";

/// Trace of the current request, from `X-Cloud-Trace-Context: TRACE_ID[/SPAN_ID][;o=OPTIONS]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceContext {
    trace_id: String,
    /// 16 hex digits, the form Cloud Logging expects
    span_id: Option<String>,
    sampled: bool,
}

impl TraceContext {
    /// Reads the trace header. Absent or malformed headers yield `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(TRACE_CONTEXT_HEADER)?.to_str().ok()?;
        Self::parse(value)
    }

    pub fn parse(value: &str) -> Option<Self> {
        let (ids, options) = match value.split_once(';') {
            Some((ids, options)) => (ids, Some(options)),
            None => (value, None),
        };
        let (trace_id, span) = match ids.split_once('/') {
            Some((trace_id, span)) => (trace_id, Some(span)),
            None => (ids, None),
        };
        if trace_id.is_empty() || !trace_id.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        // The header carries the span as a decimal number.
        let span_id = span
            .and_then(|span| span.parse::<u64>().ok())
            .map(|span| format!("{span:016x}"));
        let sampled = options.is_some_and(|options| options.trim() == "o=1");

        Some(Self {
            trace_id: trace_id.to_ascii_lowercase(),
            span_id,
            sampled,
        })
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    pub fn sampled(&self) -> bool {
        self.sampled
    }

    /// Trace resource name as used on log entries.
    pub fn resource_name(&self, project_id: &str) -> String {
        format!("projects/{project_id}/traces/{}", self.trace_id)
    }
}
