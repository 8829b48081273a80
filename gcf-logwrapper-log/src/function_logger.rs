use std::cell::Cell;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use gcf_logwrapper::{LogEntry, Payload, SourceLocation, WrappedLogger};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError, set_logger, set_max_level};

/// Records from these crates are never forwarded: they log while entries are
/// being written.
const IGNORED_TARGET_PREFIXES: &[&str] = &[
    "gcf_logwrapper",
    "reqwest",
    "hyper",
    "hyper_util",
    "h2",
    "rustls",
    "tokio",
    "want",
    "mio",
];

thread_local! {
    /// Set while this thread is inside the attached logger. Anything logged
    /// from there (a writer, a token fetch) is dropped.
    static FORWARDING: Cell<bool> = const { Cell::new(false) };
}

/// Marks the current thread as forwarding until dropped.
struct ForwardingGuard;

impl ForwardingGuard {
    fn enter() -> Option<Self> {
        if FORWARDING.with(|forwarding| forwarding.replace(true)) {
            None
        } else {
            Some(ForwardingGuard)
        }
    }
}

impl Drop for ForwardingGuard {
    fn drop(&mut self) {
        FORWARDING.with(|forwarding| forwarding.set(false));
    }
}

fn is_ignored_target(target: &str) -> bool {
    IGNORED_TARGET_PREFIXES
        .iter()
        .any(|prefix| target.starts_with(prefix))
}

static LOGGER: FunctionLog = FunctionLog {
    current: RwLock::new(None),
};

pub struct FunctionLog {
    current: RwLock<Option<WrappedLogger>>,
}

impl FunctionLog {
    pub fn init(log_level: LevelFilter) -> Result<(), SetLoggerError> {
        set_logger(&LOGGER)?;
        set_max_level(log_level);
        Ok(())
    }

    pub fn attach(logger: WrappedLogger) -> Option<WrappedLogger> {
        LOGGER.write().replace(logger)
    }

    pub fn detach() -> Option<WrappedLogger> {
        LOGGER.write().take()
    }

    fn read(&self) -> RwLockReadGuard<'_, Option<WrappedLogger>> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<WrappedLogger>> {
        self.current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) fn record_entry(record: &Record<'_>) -> LogEntry {
    let entry = LogEntry::new(
        record.level().into(),
        Payload::Text(record.args().to_string()),
    );
    match record.file() {
        Some(file) => entry.with_source_location(SourceLocation {
            file: file.to_string(),
            line: record.line().unwrap_or(0),
            function: record.module_path().map(str::to_string),
        }),
        None => entry,
    }
}

impl Log for FunctionLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
            && !is_ignored_target(metadata.target())
            && !FORWARDING.with(Cell::get)
    }

    fn log(&self, record: &Record<'_>) {
        if self.enabled(record.metadata())
            && let Some(_guard) = ForwardingGuard::enter()
            && let Some(logger) = self.read().as_ref()
        {
            logger.log_entry(record_entry(record));
        }
    }

    fn flush(&self) {
        if let Some(_guard) = ForwardingGuard::enter()
            && let Some(logger) = self.read().as_ref()
            && let Err(e) = logger.flush()
        {
            // Not `log::warn!`: it would come straight back here.
            eprintln!("gcf-logwrapper-log: flush of {} failed: {e}", logger.logger().log_name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gcf_logwrapper::Severity;

    #[test]
    fn builds_entry_from_record() {
        let entry = record_entry(
            &Record::builder()
                .args(format_args!("user {} signed in", 7))
                .level(log::Level::Warn)
                .file(Some("src/auth.rs"))
                .line(Some(88))
                .module_path(Some("app::auth"))
                .build(),
        );

        assert_eq!(entry.severity, Severity::Warning);
        assert_eq!(entry.payload.as_text(), Some("user 7 signed in"));
        assert_eq!(
            entry.source_location,
            Some(SourceLocation {
                file: "src/auth.rs".to_string(),
                line: 88,
                function: Some("app::auth".to_string()),
            })
        );
    }

    #[test]
    fn trace_records_become_debug_without_location() {
        let entry = record_entry(
            &Record::builder()
                .args(format_args!("fine detail"))
                .level(log::Level::Trace)
                .build(),
        );
        assert_eq!(entry.severity, Severity::Debug);
        assert_eq!(entry.source_location, None);
    }

    #[test]
    fn ignores_own_records() {
        log::set_max_level(LevelFilter::Trace);
        let own = Metadata::builder()
            .level(log::Level::Info)
            .target("gcf_logwrapper_client::client")
            .build();
        let app = Metadata::builder()
            .level(log::Level::Info)
            .target("my_function")
            .build();
        let transport = Metadata::builder()
            .level(log::Level::Debug)
            .target("hyper_util::client::legacy::pool")
            .build();
        assert!(!LOGGER.enabled(&own));
        assert!(!LOGGER.enabled(&transport));
        assert!(LOGGER.enabled(&app));
    }

    #[test]
    fn nothing_is_enabled_while_forwarding() {
        log::set_max_level(LevelFilter::Trace);
        let app = Metadata::builder()
            .level(log::Level::Info)
            .target("my_function")
            .build();

        let guard = ForwardingGuard::enter().expect("not yet forwarding");
        assert!(ForwardingGuard::enter().is_none());
        assert!(!LOGGER.enabled(&app));
        drop(guard);

        assert!(LOGGER.enabled(&app));
    }
}
