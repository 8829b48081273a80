use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    ClientConfig, ClientError, LogEntry, LoggingError, WriteEntriesRequest,
    config::DEFAULT_MAX_BUFFERED_ENTRIES, http::HttpEntryWriter,
};

/// Longest log ID Cloud Logging accepts
const MAX_LOG_ID_LEN: usize = 511;

/// Delivers batches of entries to Cloud Logging.
///
/// [`HttpEntryWriter`] is the production implementation. Tests and local
/// tooling can substitute their own.
pub trait EntryWriter: Send + Sync {
    /// Writes one batch. Implementations must not retry.
    fn write_entries(&self, request: &WriteEntriesRequest) -> Result<(), LoggingError>;
}

/// A Cloud Logging client bound to one project.
#[derive(Clone)]
pub struct LoggingClient {
    project_id: String,
    writer: Arc<dyn EntryWriter>,
    max_buffered_entries: usize,
}

impl LoggingClient {
    /// Creates a client that writes over HTTPS.
    ///
    /// ```rust,no_run
    /// # use gcf_logwrapper_client::{ClientConfig, LoggingClient, Severity, LogEntry};
    /// # fn f() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = LoggingClient::new("my-project", ClientConfig::from_env())?;
    /// let logger = client.logger("orders")?;
    /// logger.log(LogEntry::new(Severity::Info, "order received".into()));
    /// logger.flush()?;
    /// # Ok(()) }
    /// ```
    pub fn new(project_id: impl Into<String>, config: ClientConfig) -> Result<Self, ClientError> {
        let writer = HttpEntryWriter::new(&config)?;
        Ok(Self::with_writer(project_id, Arc::new(writer))?
            .with_max_buffered_entries(config.max_buffered_entries()))
    }

    /// Creates a client around a custom [`EntryWriter`].
    pub fn with_writer(
        project_id: impl Into<String>,
        writer: Arc<dyn EntryWriter>,
    ) -> Result<Self, ClientError> {
        let project_id = project_id.into();
        if project_id.is_empty() {
            return Err(ClientError::MissingProject);
        }
        Ok(Self {
            project_id,
            writer,
            max_buffered_entries: DEFAULT_MAX_BUFFERED_ENTRIES,
        })
    }

    /// Sets how many entries each logger holds before flushing on its own.
    pub fn with_max_buffered_entries(mut self, max_buffered_entries: usize) -> Self {
        self.max_buffered_entries = max_buffered_entries.max(1);
        self
    }

    /// The project entries are written to
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Returns a logger writing to `projects/{project}/logs/{log_id}`.
    ///
    /// Log IDs are at most 511 characters of letters, digits, `/`, `_`, `-` and `.`.
    pub fn logger(&self, log_id: &str) -> Result<Logger, ClientError> {
        validate_log_id(log_id)?;
        Ok(Logger {
            log_name: format!(
                "projects/{}/logs/{}",
                self.project_id,
                urlencoding::encode(log_id)
            ),
            log_id: log_id.to_string(),
            writer: self.writer.clone(),
            max_buffered_entries: self.max_buffered_entries,
            buffer: Mutex::new(Vec::new()),
            dropped: AtomicU64::new(0),
        })
    }
}

impl fmt::Debug for LoggingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggingClient")
            .field("project_id", &self.project_id)
            .field("max_buffered_entries", &self.max_buffered_entries)
            .finish_non_exhaustive()
    }
}

fn validate_log_id(log_id: &str) -> Result<(), ClientError> {
    let invalid = |reason| ClientError::InvalidLogId {
        log_id: log_id.to_string(),
        reason,
    };
    if log_id.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if log_id.len() > MAX_LOG_ID_LEN {
        return Err(invalid("must be at most 511 characters"));
    }
    if !log_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '_' | '-' | '.'))
    {
        return Err(invalid(
            "may only contain letters, digits, '/', '_', '-' and '.'",
        ));
    }
    Ok(())
}

/// A named log. Entries are buffered and written in batches.
///
/// Buffering never retries: a batch that fails to write is gone. An explicit
/// [`Logger::flush`] reports the failure; an automatic flush, triggered when the
/// buffer fills, counts the dropped entries and warns through `log`.
pub struct Logger {
    log_name: String,
    log_id: String,
    writer: Arc<dyn EntryWriter>,
    max_buffered_entries: usize,
    buffer: Mutex<Vec<LogEntry>>,
    dropped: AtomicU64,
}

impl Logger {
    /// Buffers an entry, flushing if the buffer is full.
    pub fn log(&self, entry: LogEntry) {
        let full_batch = {
            let mut buffer = self.lock_buffer();
            buffer.push(entry);
            if buffer.len() >= self.max_buffered_entries {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            }
        };

        if let Some(batch) = full_batch {
            let count = batch.len();
            if let Err(e) = self.write(batch) {
                self.dropped.fetch_add(count as u64, Ordering::Relaxed);
                log::warn!("dropped {count} entries for {}: {e}", self.log_name);
            }
        }
    }

    /// Writes every buffered entry in a single request.
    pub fn flush(&self) -> Result<(), LoggingError> {
        let batch = std::mem::take(&mut *self.lock_buffer());
        if batch.is_empty() {
            return Ok(());
        }
        self.write(batch)
    }

    /// Full log name, `projects/{project}/logs/{log_id}`
    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    /// Log ID as given to [`LoggingClient::logger`]
    pub fn log_id(&self) -> &str {
        &self.log_id
    }

    /// Entries waiting for the next flush
    pub fn buffered(&self) -> usize {
        self.lock_buffer().len()
    }

    /// Entries lost to failed automatic flushes
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn write(&self, entries: Vec<LogEntry>) -> Result<(), LoggingError> {
        let count = entries.len();
        let request = WriteEntriesRequest {
            log_name: self.log_name.clone(),
            entries,
            partial_success: false,
        };
        self.writer.write_entries(&request)?;
        log::debug!("wrote {count} entries to {}", self.log_name);
        Ok(())
    }

    fn lock_buffer(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("log_name", &self.log_name)
            .field("buffered", &self.buffered())
            .field("dropped", &self.dropped())
            .finish_non_exhaustive()
    }
}
