//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for Atlas binaries.
//!
//! * Console output (compact, ANSI) is on by default.
//! * [`LoggerBuilder::file`] adds a non-blocking, daily rolling file sink; the
//!   file-only knobs (retention, JSON) become available after it.
//! * [`LoggerBuilder::filter`] adds `target=level` directives on top of the
//!   base level. Without explicit directives `RUST_LOG` is honored.
//!
//! ## Example
//!
//! ```rust
//! # use atlas_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder("atlas-server")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;

use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_MAX_FILES: usize = 10;
const LOG_FILE_SUFFIX: &str = "log";

/// Parses a level name (`trace`, `debug`, `info`, `warn`, `error`, `off`).
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("Unknown log level '{level}'").into(),
        context: None,
    })
}

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    max_files: usize,
    json: bool,
}

/// Builder state: console output only.
#[derive(Debug)]
pub struct ConsoleOnly;
/// Builder state: a file sink is configured.
#[derive(Debug)]
pub struct WithFile;

/// Configures and installs the global tracing subscriber.
#[derive(Debug)]
pub struct LoggerBuilder<S = ConsoleOnly> {
    name: String,
    level: LevelFilter,
    filter: Option<String>,
    console: bool,
    file: Option<FileSink>,
    state: PhantomData<S>,
}

impl<S> LoggerBuilder<S> {
    /// Base level for targets without an explicit directive.
    #[must_use]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Extra `target=level` directives, e.g. `atlas_introspection=debug,tower_http=info`.
    ///
    /// Invalid directives make [`LoggerBuilder::init`] fail.
    #[must_use]
    pub fn filter(mut self, directives: impl Into<String>) -> Self {
        self.filter = Some(directives.into());
        self
    }

    #[must_use]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// Adds a daily-rotated file sink under `dir`, named after the logger.
    pub fn file(self, dir: impl Into<PathBuf>) -> LoggerBuilder<WithFile> {
        LoggerBuilder {
            name: self.name,
            level: self.level,
            filter: self.filter,
            console: self.console,
            file: Some(FileSink {
                dir: dir.into(),
                max_files: DEFAULT_MAX_FILES,
                json: false,
            }),
            state: PhantomData,
        }
    }

    /// Installs the subscriber.
    ///
    /// Keep the returned [`Logger`] alive for the lifetime of the program:
    /// it owns the background writer of the file sink.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero retention,
    ///   bad filter directives or when no sink is enabled.
    /// * [`LoggerError::Io`] / [`LoggerError::Appender`] when the file sink cannot be set up.
    /// * [`LoggerError::Subscriber`] when a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        self.validate()?;
        let env_filter = self.env_filter()?;

        let mut layers = Vec::new();
        if self.console {
            layers.push(layer().compact().with_ansi(true).boxed());
        }

        let guard = match self.file {
            Some(sink) => {
                fs::create_dir_all(&sink.dir)
                    .context(format!("Creating {}", sink.dir.display()))?;

                let appender = RollingFileAppender::builder()
                    .rotation(Rotation::DAILY)
                    .filename_prefix(&self.name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(sink.max_files)
                    .build(&sink.dir)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file_layer = layer().with_writer(writer).with_ansi(false);
                layers.push(if sink.json { file_layer.json().boxed() } else { file_layer.boxed() });
                Some(guard)
            },
            None => None,
        };

        if layers.is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "No logging sink enabled; enable the console or a file sink".into(),
                context: None,
            });
        }

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;
        tracing::debug!(logger = %self.name, "Tracing subscriber installed");

        Ok(Logger { guard })
    }

    fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(LoggerError::InvalidConfiguration {
                message: "Logger name cannot be empty".into(),
                context: None,
            });
        }
        if self.file.as_ref().is_some_and(|sink| sink.max_files == 0) {
            return Err(LoggerError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
        Ok(())
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level.into());
        match &self.filter {
            None => Ok(builder.from_env_lossy()),
            Some(directives) => builder.parse(directives).map_err(|e| {
                LoggerError::InvalidConfiguration {
                    message: format!("Invalid filter '{directives}': {e}").into(),
                    context: None,
                }
            }),
        }
    }
}

impl LoggerBuilder<WithFile> {
    /// Number of rotated files to keep.
    #[must_use]
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(sink) = self.file.as_mut() {
            sink.max_files = max;
        }
        self
    }

    /// Writes the file sink as JSON lines.
    #[must_use]
    pub fn json(mut self, enabled: bool) -> Self {
        if let Some(sink) = self.file.as_mut() {
            sink.json = enabled;
        }
        self
    }
}

/// Handle to the installed subscriber. Dropping it flushes and stops the
/// file writer.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder; `name` prefixes rolled files (`atlas-server.2026-10-16.log`).
    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder {
            name: name.into(),
            level: LevelFilter::INFO,
            filter: None,
            console: true,
            file: None,
            state: PhantomData,
        }
    }

    /// Whether a file sink is attached.
    #[must_use]
    pub const fn has_file_sink(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let builder = Logger::builder("atlas-test").filter("atlas=debug");
        assert!(builder.console);
        assert_eq!(builder.level, LevelFilter::INFO);
        assert_eq!(builder.filter.as_deref(), Some("atlas=debug"));
        assert!(builder.file.is_none());
    }

    #[test]
    fn file_sink_settings() {
        let builder = Logger::builder("atlas-test")
            .file("/tmp/atlas-logs")
            .max_files(3)
            .json(true)
            .level(LevelFilter::DEBUG);

        let sink = builder.file.as_ref().unwrap();
        assert_eq!(sink.max_files, 3);
        assert!(sink.json);
        assert_eq!(sink.dir, PathBuf::from("/tmp/atlas-logs"));
        assert_eq!(builder.level, LevelFilter::DEBUG);
    }

    #[test]
    fn level_names() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert!(parse_level("loud").is_err());
    }

    #[test]
    fn invalid_settings_fail_before_install() {
        let err = Logger::builder(" ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder("atlas-test").file("/tmp/atlas-logs").max_files(0).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder("atlas-test").console(false).init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = Logger::builder("atlas-test").filter("atlas=loudest").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
