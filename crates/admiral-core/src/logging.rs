//! Logging infrastructure for ADMIRAL.
//!
//! Structured logging on top of the `tracing` ecosystem. The dashboard owns
//! the terminal while it runs, so the primary sink is a JSON lines file under
//! `~/.admiral/logs/`. A human-readable stderr layer can be switched on for
//! headless runs.
//!
//! ## Example
//!
//! ```no_run
//! use admiral_core::logging::{self, LogOptions};
//!
//! let _guard = logging::init_logging(LogOptions::default()).expect("logging init");
//!
//! tracing::info!("ADMIRAL started");
//! tracing::debug!(question_id = "Q-1", "question queued");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{AdmiralError, Result};

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "admiral.log";

/// Guard that must be held to ensure log flushing on shutdown.
///
/// When this guard is dropped, it flushes any pending log entries.
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Options for [`init_logging`].
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Custom log directory. Defaults to `~/.admiral/logs/`.
    pub log_dir: Option<PathBuf>,
    /// DEBUG instead of INFO.
    pub verbose: bool,
    /// Also write human-readable logs to stderr.
    pub console: bool,
}

impl LogOptions {
    /// Set the log directory.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Enable verbose (DEBUG) logging.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enable the stderr layer.
    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }
}

/// Initialize the ADMIRAL logging system.
///
/// This sets up:
/// - File logging to `<log_dir>/admiral.log` (JSON lines, rolled daily)
/// - Optional console logging to stderr (human-readable format)
///
/// `RUST_LOG` overrides the default `admiral=info` / `admiral=debug` filter.
///
/// Returns a [`LogGuard`] that must be held for the application lifetime so
/// buffered entries reach the file.
pub fn init_logging(options: LogOptions) -> Result<LogGuard> {
    let log_dir = match options.log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| AdmiralError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if options.verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("admiral={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true)
        .with_span_list(true);

    let console_layer = options.console.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_file(options.verbose)
            .with_line_number(options.verbose)
            .compact()
            .boxed()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| AdmiralError::internal(format!("tracing subscriber already set: {e}")))?;

    tracing::debug!(
        log_dir = %log_dir.display(),
        verbose = options.verbose,
        console = options.console,
        "logging initialized"
    );

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the ADMIRAL home directory (`~/.admiral`).
pub fn admiral_home() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| AdmiralError::Internal {
        message: "home directory could not be determined".into(),
    })?;

    Ok(home.join(".admiral"))
}

/// Get the default log directory path.
///
/// Returns `~/.admiral/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    Ok(admiral_home()?.join("logs"))
}

/// Get the default ADMIRAL log file path.
///
/// Returns `~/.admiral/logs/admiral.log`
pub fn default_log_file() -> Result<PathBuf> {
    Ok(default_log_dir()?.join(LOG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_default_log_dir() {
        // SAFETY: tests touching HOME are serialized
        unsafe { std::env::set_var("HOME", "/tmp/test-home") };
        let dir = default_log_dir().unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/test-home/.admiral/logs"));
    }

    #[test]
    #[serial]
    fn test_default_log_file() {
        // SAFETY: tests touching HOME are serialized
        unsafe { std::env::set_var("HOME", "/tmp/test-home") };
        let file = default_log_file().unwrap();
        assert_eq!(file, PathBuf::from("/tmp/test-home/.admiral/logs/admiral.log"));
    }

    #[test]
    fn test_log_options_builder() {
        let options = LogOptions::default()
            .with_log_dir("/var/log/admiral")
            .verbose(true)
            .with_console(true);
        assert_eq!(options.log_dir, Some(PathBuf::from("/var/log/admiral")));
        assert!(options.verbose);
        assert!(options.console);
    }

    #[test]
    fn test_init_test_logging() {
        // Should not panic
        init_test_logging();
    }
}
