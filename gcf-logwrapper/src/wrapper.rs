use std::collections::BTreeMap;
use std::sync::Arc;

use gcf_logwrapper_client::{
    ClientConfig, ClientError, EntryWriter, LogEntry, Logger, LoggingClient, LoggingError,
    MonitoredResource, Severity,
    encoding::{IntoPayload, PayloadError},
};
use http::Request;

use crate::{
    EnvironmentError, ExecutionIdError, ExecutionIdSource, FunctionEnvironment,
    InvocationContext, TraceContext,
};

/// Label carrying the execution ID on every entry
pub const EXECUTION_ID_LABEL: &str = "execution_id";

/// Why a [`WrappedLogger`] could not be created.
#[derive(thiserror::Error, Debug)]
pub enum WrapperError {
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    #[error(transparent)]
    Client(#[from] ClientError),

    /// The cause is available through [`std::error::Error::source`].
    #[error("Failed to get executionId")]
    ExecutionId(#[source] ExecutionIdError),
}

type Lookup = Box<dyn Fn(&str) -> Option<String>>;

/// A Cloud Logging logger for one function invocation.
///
/// Every entry is attributed to the `cloud_function` monitored resource and
/// labelled with the invocation's execution ID. The logger is immutable once
/// built; flush it before the invocation ends.
#[derive(Debug)]
pub struct WrappedLogger {
    resource: MonitoredResource,
    logger: Logger,
    labels: BTreeMap<String, String>,
    trace: Option<(String, TraceContext)>,
}

impl WrappedLogger {
    /// Creates a logger for an HTTP invocation.
    ///
    /// The execution ID comes from the `Function-Execution-Id` header. When an
    /// `X-Cloud-Trace-Context` header is present, entries are also linked to
    /// the request's trace.
    ///
    /// ```rust,no_run
    /// # use gcf_logwrapper::{Json, WrappedLogger};
    /// # fn f(request: http::Request<Vec<u8>>) -> Result<(), Box<dyn std::error::Error>> {
    /// let logger = WrappedLogger::from_request(&request, "checkout")?;
    /// logger.debug("validating cart");
    /// logger.info(Json(serde_json::json!({"items": 3, "total_cents": 4599})));
    /// logger.flush()?;
    /// # Ok(()) }
    /// ```
    pub fn from_request<B>(request: &Request<B>, logger_name: &str) -> Result<Self, WrapperError> {
        Self::builder(logger_name).from_request(request)
    }

    /// Creates a logger for an event-triggered invocation. The execution ID is
    /// the event ID of the context's metadata.
    pub fn from_context(
        context: &InvocationContext,
        logger_name: &str,
    ) -> Result<Self, WrapperError> {
        Self::builder(logger_name).from_context(context)
    }

    /// Starts building a logger with custom settings.
    pub fn builder(logger_name: impl Into<String>) -> WrappedLoggerBuilder {
        WrappedLoggerBuilder {
            logger_name: logger_name.into(),
            lookup: Box::new(|name| std::env::var(name).ok()),
            environment: None,
            client_config: None,
            writer: None,
            labels: BTreeMap::new(),
            trace: None,
        }
    }

    pub fn debug(&self, payload: impl IntoPayload) {
        self.log(Severity::Debug, payload)
    }

    pub fn info(&self, payload: impl IntoPayload) {
        self.log(Severity::Info, payload)
    }

    pub fn warning(&self, payload: impl IntoPayload) {
        self.log(Severity::Warning, payload)
    }

    pub fn error(&self, payload: impl IntoPayload) {
        self.log(Severity::Error, payload)
    }

    /// Logs with an explicit severity. A payload that cannot be encoded is
    /// dropped with a warning; use [`WrappedLogger::try_log`] to handle it.
    pub fn log(&self, severity: Severity, payload: impl IntoPayload) {
        if let Err(e) = self.try_log(severity, payload) {
            log::warn!("dropping {severity} entry for {}: {e}", self.logger.log_name());
        }
    }

    pub fn try_log(&self, severity: Severity, payload: impl IntoPayload) -> Result<(), PayloadError> {
        let payload = payload
            .try_into_payload()
            .map_err(Into::<PayloadError>::into)?;
        self.log_entry(LogEntry::new(severity, payload));
        Ok(())
    }

    /// Logs a prepared entry after attaching the resource, the request labels
    /// and, unless the entry has its own, the request trace.
    pub fn log_entry(&self, entry: LogEntry) {
        let mut entry = entry
            .with_resource(self.resource.clone())
            .with_labels(self.labels.clone());
        if entry.trace.is_none()
            && let Some((name, trace)) = &self.trace
        {
            entry = entry.with_trace(
                name.clone(),
                trace.span_id().map(str::to_string),
                trace.sampled(),
            );
        }
        self.logger.log(entry);
    }

    /// Writes all buffered entries.
    pub fn flush(&self) -> Result<(), LoggingError> {
        self.logger.flush()
    }

    pub fn resource(&self) -> &MonitoredResource {
        &self.resource
    }

    pub fn labels(&self) -> &BTreeMap<String, String> {
        &self.labels
    }

    pub fn execution_id(&self) -> &str {
        self.labels
            .get(EXECUTION_ID_LABEL)
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn trace(&self) -> Option<&TraceContext> {
        self.trace.as_ref().map(|(_, trace)| trace)
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl Drop for WrappedLogger {
    fn drop(&mut self) {
        if self.logger.buffered() > 0
            && let Err(e) = self.logger.flush()
        {
            log::warn!("lost entries for {} on drop: {e}", self.logger.log_name());
        }
    }
}

/// Builder for [`WrappedLogger`] with overridable environment and transport.
///
/// ```rust
/// # use std::sync::Arc;
/// # use gcf_logwrapper::{EntryWriter, FunctionEnvironment, InvocationContext, EventMetadata, WrappedLogger};
/// # fn f(writer: Arc<dyn EntryWriter>) -> Result<(), gcf_logwrapper::WrapperError> {
/// let context = InvocationContext::new().with_metadata(EventMetadata::new("evt-1"));
/// let logger = WrappedLogger::builder("jobs")
///     .environment(FunctionEnvironment::new("my-project", "nightly", "europe-west1"))
///     .writer(writer)
///     .label("tenant", "acme")
///     .from_context(&context)?;
/// assert_eq!(logger.execution_id(), "evt-1");
/// # Ok(()) }
/// ```
pub struct WrappedLoggerBuilder {
    logger_name: String,
    lookup: Lookup,
    environment: Option<FunctionEnvironment>,
    client_config: Option<ClientConfig>,
    writer: Option<Arc<dyn EntryWriter>>,
    labels: BTreeMap<String, String>,
    trace: Option<TraceContext>,
}

impl WrappedLoggerBuilder {
    /// Reads environment variables through `lookup` instead of the process environment.
    pub fn lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.lookup = Box::new(lookup);
        self
    }

    /// Uses a known function identity instead of reading it from the environment.
    pub fn environment(mut self, environment: FunctionEnvironment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn client_config(mut self, config: ClientConfig) -> Self {
        self.client_config = Some(config);
        self
    }

    /// Sends entries through `writer` instead of the Cloud Logging API.
    pub fn writer(mut self, writer: Arc<dyn EntryWriter>) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Adds a request-scoped label. `execution_id` cannot be overridden.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn trace(mut self, trace: TraceContext) -> Self {
        self.trace = Some(trace);
        self
    }

    /// Builds for an HTTP invocation, see [`WrappedLogger::from_request`].
    pub fn from_request<B>(mut self, request: &Request<B>) -> Result<WrappedLogger, WrapperError> {
        if self.trace.is_none() {
            self.trace = TraceContext::from_headers(request.headers());
        }
        self.build(request)
    }

    /// Builds for an event invocation, see [`WrappedLogger::from_context`].
    pub fn from_context(self, context: &InvocationContext) -> Result<WrappedLogger, WrapperError> {
        self.build(context)
    }

    /// Builds with any execution ID source.
    ///
    /// Preconditions are checked in order: environment, logging client,
    /// execution ID. The first failure is returned.
    pub fn build<S>(self, source: &S) -> Result<WrappedLogger, WrapperError>
    where
        S: ExecutionIdSource + ?Sized,
    {
        let Self {
            logger_name,
            lookup,
            environment,
            client_config,
            writer,
            mut labels,
            trace,
        } = self;

        let environment = match environment {
            Some(environment) => environment,
            None => FunctionEnvironment::from_lookup(|name| lookup(name))?,
        };
        let resource = environment.monitored_resource();

        let client_config =
            client_config.unwrap_or_else(|| ClientConfig::from_lookup(|name| lookup(name)));
        let client = match writer {
            Some(writer) => LoggingClient::with_writer(environment.project_id(), writer)?
                .with_max_buffered_entries(client_config.max_buffered_entries()),
            None => LoggingClient::new(environment.project_id(), client_config)?,
        };
        let logger = client.logger(&logger_name)?;

        let execution_id = source
            .execution_id()
            .map_err(WrapperError::ExecutionId)?;
        labels.insert(EXECUTION_ID_LABEL.to_string(), execution_id);

        log::debug!(
            "logging to {} for {} in {}",
            logger.log_name(),
            environment.function_name(),
            environment.region()
        );

        Ok(WrappedLogger {
            resource,
            logger,
            labels,
            trace: trace.map(|trace| (trace.resource_name(environment.project_id()), trace)),
        })
    }
}
