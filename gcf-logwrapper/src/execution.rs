use http::{HeaderMap, Request};

use crate::InvocationContext;

/// Header the Cloud Functions runtime sets on every HTTP invocation
pub const EXECUTION_ID_HEADER: &str = "Function-Execution-Id";

/// The execution ID could not be determined.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionIdError {
    #[error("Header 'Function-Execution-Id' is missing")]
    MissingHeader,
    #[error("Header 'Function-Execution-Id' is not valid text")]
    InvalidHeader,
    #[error("Failed to get metadata")]
    MissingMetadata,
    #[error("Event ID is missing")]
    MissingEventId,
}

/// Where the ID of the current invocation comes from.
pub trait ExecutionIdSource {
    fn execution_id(&self) -> Result<String, ExecutionIdError>;
}

impl ExecutionIdSource for HeaderMap {
    fn execution_id(&self) -> Result<String, ExecutionIdError> {
        let value = self
            .get(EXECUTION_ID_HEADER)
            .ok_or(ExecutionIdError::MissingHeader)?;
        let id = value
            .to_str()
            .map_err(|_| ExecutionIdError::InvalidHeader)?;
        if id.is_empty() {
            return Err(ExecutionIdError::MissingHeader);
        }
        Ok(id.to_string())
    }
}

impl<B> ExecutionIdSource for Request<B> {
    fn execution_id(&self) -> Result<String, ExecutionIdError> {
        self.headers().execution_id()
    }
}

impl ExecutionIdSource for InvocationContext {
    fn execution_id(&self) -> Result<String, ExecutionIdError> {
        let metadata = self.metadata().ok_or(ExecutionIdError::MissingMetadata)?;
        if metadata.event_id.is_empty() {
            return Err(ExecutionIdError::MissingEventId);
        }
        Ok(metadata.event_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EventMetadata;
    use http::HeaderValue;

    #[test]
    fn reads_header_case_insensitively() {
        let request = Request::builder()
            .header("FUNCTION-EXECUTION-ID", "ex-123")
            .body(())
            .expect("request");
        assert_eq!(request.execution_id(), Ok("ex-123".to_string()));
    }

    #[test]
    fn uses_first_header_value() {
        let mut headers = HeaderMap::new();
        headers.append("function-execution-id", HeaderValue::from_static("first"));
        headers.append("function-execution-id", HeaderValue::from_static("second"));
        assert_eq!(headers.execution_id(), Ok("first".to_string()));
    }

    #[test]
    fn missing_or_empty_header() {
        assert_eq!(
            HeaderMap::new().execution_id(),
            Err(ExecutionIdError::MissingHeader)
        );

        let mut headers = HeaderMap::new();
        headers.insert("function-execution-id", HeaderValue::from_static(""));
        let error = headers.execution_id().expect_err("empty header");
        assert_eq!(error.to_string(), "Header 'Function-Execution-Id' is missing");
    }

    #[test]
    fn non_text_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "function-execution-id",
            HeaderValue::from_bytes(&[0xff, 0xfe]).expect("opaque header value"),
        );
        assert_eq!(headers.execution_id(), Err(ExecutionIdError::InvalidHeader));
    }

    #[test]
    fn reads_event_id_from_context() {
        let context = InvocationContext::new().with_metadata(EventMetadata::new("eventId"));
        assert_eq!(context.execution_id(), Ok("eventId".to_string()));

        let error = InvocationContext::new().execution_id().expect_err("no metadata");
        assert_eq!(error.to_string(), "Failed to get metadata");

        let empty = InvocationContext::new().with_metadata(EventMetadata::default());
        assert_eq!(empty.execution_id(), Err(ExecutionIdError::MissingEventId));
    }
}
