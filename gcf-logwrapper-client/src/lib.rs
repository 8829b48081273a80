#![deny(missing_docs)]

//! Cloud Logging client for Cloud Functions
//!
//! This crate is the small slice of the Cloud Logging API that `gcf-logwrapper`
//! needs: monitored resources, severities, entries, a buffering [`Logger`] and the
//! `entries:write` call behind the [`EntryWriter`] seam.
//!
//! You are likely to be interested in the sibling crates:
//! * [`gcf-logwrapper`](https://crates.io/crates/gcf-logwrapper): Wraps a logger with Cloud Functions metadata.
//! * [`gcf-logwrapper-log`](https://crates.io/crates/gcf-logwrapper-log): Standard `log` adapter.

pub mod auth;
mod client;
mod config;
pub mod encoding;
mod entry;
mod error;
pub mod http;
mod resource;
mod severity;

pub use client::{EntryWriter, Logger, LoggingClient};
pub use config::ClientConfig;
pub use entry::{LogEntry, SourceLocation, WriteEntriesRequest};
pub use error::{ClientError, LoggingError};
pub use resource::MonitoredResource;
pub use severity::Severity;
