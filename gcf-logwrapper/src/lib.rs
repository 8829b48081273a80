//! Cloud Functions metadata for Cloud Logging
//!
//! Wraps a Cloud Logging logger so that every entry written during an invocation
//! carries the `cloud_function` monitored resource (project, function name,
//! region) and the invocation's `execution_id` label.
//!
//! ```rust,no_run
//! use gcf_logwrapper::WrappedLogger;
//!
//! fn handle(request: http::Request<Vec<u8>>) -> Result<(), Box<dyn std::error::Error>> {
//!     let logger = WrappedLogger::from_request(&request, "orders")?;
//!     logger.info("order received");
//!     logger.flush()?;
//!     Ok(())
//! }
//! ```
//!
//! You are likely to be interested in the sibling crates:
//! * [`gcf-logwrapper-client`](https://crates.io/crates/gcf-logwrapper-client): The Cloud Logging client underneath.
//! * [`gcf-logwrapper-log`](https://crates.io/crates/gcf-logwrapper-log): Standard `log` adapter.

mod context;
mod environment;
mod execution;
mod trace;
mod wrapper;

pub use context::{EventMetadata, EventResource, InvocationContext};
pub use environment::{EnvironmentError, FunctionEnvironment};
pub use execution::{EXECUTION_ID_HEADER, ExecutionIdError, ExecutionIdSource};
pub use trace::{TRACE_CONTEXT_HEADER, TraceContext};
pub use wrapper::{EXECUTION_ID_LABEL, WrappedLogger, WrappedLoggerBuilder, WrapperError};

pub use gcf_logwrapper_client::{
    ClientConfig, EntryWriter, LogEntry, LoggingError, MonitoredResource, Severity,
    SourceLocation, WriteEntriesRequest,
    encoding::{IntoPayload, Json, Payload, PayloadError},
};
