//! Client error types

use crate::{auth::TokenError, encoding::PayloadError};

/// Failure to create a client or one of its loggers.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The project ID was empty.
    #[error("project ID must not be empty")]
    MissingProject,

    /// The log ID cannot be used as part of a log name.
    #[error("invalid log ID '{log_id}': {reason}")]
    InvalidLogId {
        /// The offending log ID
        log_id: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// The underlying HTTP client could not be built.
    #[error("failed to create HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Failure while writing entries to Cloud Logging.
#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    /// No access token could be obtained.
    #[error("Authentication error: {0}")]
    Auth(#[from] TokenError),

    /// The request did not reach Cloud Logging or the response was unreadable.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Cloud Logging rejected the request.
    #[error("Cloud Logging API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// An entry payload could not be encoded.
    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),
}
