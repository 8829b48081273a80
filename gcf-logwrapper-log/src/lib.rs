//! `log` adapter for gcf-logwrapper
//!
//! This crate adapts [`log`](https://docs.rs/log) to Cloud Functions. Records
//! logged with `log::info!` and friends are written through the
//! [`WrappedLogger`] attached to the current invocation, so they carry the
//! function's monitored resource and execution ID.
//!
//! ```rust,no_run
//! use gcf_logwrapper::WrappedLogger;
//!
//! # fn f(request: http::Request<Vec<u8>>) -> Result<(), Box<dyn std::error::Error>> {
//! // once, at startup
//! gcf_logwrapper_log::configure_logging(log::LevelFilter::Info)?;
//!
//! // per invocation
//! gcf_logwrapper_log::attach(WrappedLogger::from_request(&request, "my-function")?);
//! log::info!("handling {} bytes", request.body().len());
//! gcf_logwrapper_log::detach()?;
//! # Ok(()) }
//! ```
//!
//! You are likely to be interested in the sibling crates:
//! * [`gcf-logwrapper`](https://crates.io/crates/gcf-logwrapper): The wrapped logger itself.
//! * [`gcf-logwrapper-client`](https://crates.io/crates/gcf-logwrapper-client): The Cloud Logging client underneath.

use gcf_logwrapper::{LoggingError, WrappedLogger};
use log::SetLoggerError;
use thiserror::Error;

mod function_logger;

#[derive(Debug, Error)]
pub enum LogConfigError {
    #[error("Failed to initialize function logger: {cause}")]
    Init { cause: SetLoggerError },
}

/// Installs the function logger as the global `log` logger.
///
/// You **must** only call this function once.
pub fn configure_logging(level: log::LevelFilter) -> Result<(), LogConfigError> {
    function_logger::FunctionLog::init(level).map_err(|e| LogConfigError::Init { cause: e })
}

/// Sends `log` records to `logger` until [`detach`] is called. Returns the
/// previously attached logger, if any, without flushing it.
pub fn attach(logger: WrappedLogger) -> Option<WrappedLogger> {
    function_logger::FunctionLog::attach(logger)
}

/// Stops sending records to the attached logger and flushes it.
pub fn detach() -> Result<(), LoggingError> {
    match function_logger::FunctionLog::detach() {
        Some(logger) => logger.flush(),
        None => Ok(()),
    }
}
