//! Logging configuration for campusdb
//!
//! Structured logging through the `tracing` framework. The library itself
//! only emits events; applications embedding the portal store call
//! [`LogConfig::init`] once to decide where those events go.

use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// File name used when a log path has none.
const DEFAULT_LOG_FILE: &str = "campusdb.log";

/// Log output destination
#[derive(Debug, Clone)]
pub enum LogOutput {
    /// Output to stdout
    Stdout,
    /// Output to a daily-rotated file
    File(PathBuf),
    /// Output to both stdout and file
    Both(PathBuf),
}

/// Log format style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable multi-line format (default)
    Pretty,
    /// Compact single-line format
    Compact,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Minimum log level filter, in `EnvFilter` syntax
    pub level: String,
    /// Output destination
    pub output: LogOutput,
    /// Format style
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            output: LogOutput::Stdout,
            format: LogFormat::Pretty,
        }
    }
}

impl LogConfig {
    /// Info level to stdout
    pub fn info() -> Self {
        Self::default()
    }

    /// Debug level; shows every executed statement
    pub fn debug() -> Self {
        Self::default().with_level("debug")
    }

    /// Warn level; only storage problems
    pub fn warn() -> Self {
        Self::default().with_level("warn")
    }

    /// Set log output to a daily-rotated file
    pub fn with_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::File(path.into());
        self
    }

    /// Set log output to both stdout and file
    pub fn with_both<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.output = LogOutput::Both(path.into());
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set log level filter
    pub fn with_level<S: Into<String>>(mut self, level: S) -> Self {
        self.level = level.into();
        self
    }

    /// The filter `init` installs: `RUST_LOG` when set, else the configured
    /// level, else `info`.
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    }

    /// Initialize global logging with this configuration
    ///
    /// Returns a guard that must be kept alive while file logging is in use;
    /// dropping it flushes and stops the background writer. Stdout logging
    /// returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use campusdb::logging::LogConfig;
    ///
    /// let _guard = LogConfig::info().with_file("logs/portal.log").init();
    /// ```
    pub fn init(self) -> Option<WorkerGuard> {
        let env_filter = self.env_filter();

        match self.output {
            LogOutput::Stdout => {
                match self.format {
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().pretty())
                        .init(),
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().compact())
                        .init(),
                }
                None
            }
            LogOutput::File(path) => {
                let (writer, guard) = file_writer(&path);
                match self.format {
                    LogFormat::Pretty => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(writer).with_ansi(false).pretty())
                        .init(),
                    LogFormat::Compact => tracing_subscriber::registry()
                        .with(env_filter)
                        .with(fmt::layer().with_writer(writer).with_ansi(false).compact())
                        .init(),
                }
                Some(guard)
            }
            LogOutput::Both(path) => {
                let (writer, guard) = file_writer(&path);
                // Both sinks use the default format.
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(fmt::layer())
                    .with(fmt::layer().with_writer(writer).with_ansi(false))
                    .init();
                Some(guard)
            }
        }
    }
}

/// Splits `path` into the directory and file name the rolling appender wants.
fn log_location(path: &Path) -> (&Path, &str) {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_LOG_FILE);
    (dir, file)
}

fn file_writer(path: &Path) -> (NonBlocking, WorkerGuard) {
    let (dir, file) = log_location(path);
    tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, file))
}
