//! Logging setup for Tether.
//!
//! The `[logging]` section of the configuration drives a `tracing-subscriber`
//! stack: an env filter, one `fmt` layer in the configured format, and a
//! writer for the configured output. Span events make `enable` / `reload` /
//! `disable` and the per-service steps inside them visible with timings.
//!
//! ```rust,ignore
//! use tether_runtime::config::load_config;
//! use tether_runtime::logging;
//!
//! let config = load_config()?;
//! logging::init_from_config(&config.logging);
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::warn;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

const FALLBACK_FILE_NAME: &str = "tether.log";

/// Which span lifecycle events are logged.
///
/// Every lifecycle operation runs in an `INFO` span and every service step in
/// a `DEBUG` span, so `new` + `close` shows how long each of them took.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanEvents {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

impl SpanEvents {
    fn to_fmt_span(self) -> fmt::format::FmtSpan {
        use fmt::format::FmtSpan;

        [
            (self.new, FmtSpan::NEW),
            (self.enter, FmtSpan::ENTER),
            (self.exit, FmtSpan::EXIT),
            (self.close, FmtSpan::CLOSE),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .fold(FmtSpan::NONE, |span, (_, flag)| span | flag)
    }
}

impl From<&SpanEventConfig> for SpanEvents {
    fn from(config: &SpanEventConfig) -> Self {
        Self {
            new: config.new,
            enter: config.enter,
            exit: config.exit,
            close: config.close,
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed, so hosts that set
/// up their own subscriber keep it.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// Subscriber settings resolved from a [`LoggingConfig`].
#[derive(Debug)]
pub struct LoggingBuilder {
    level: tracing::Level,
    /// Extra `target=level` directives from `[logging.filters]`.
    directives: Vec<String>,
    span_events: SpanEvents,
    format: LogFormat,
    output: LogOutput,
    thread_ids: bool,
    file_location: bool,
    file_path: Option<PathBuf>,
}

impl LoggingBuilder {
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.to_tracing_level(),
            directives: config
                .filters
                .iter()
                .map(|(target, level)| format!("{}={}", target, level.to_lowercase()))
                .collect(),
            span_events: SpanEvents::from(&config.span_events),
            format: config.format,
            output: config.output,
            thread_ids: config.thread_ids,
            file_location: config.file_location,
            file_path: config.file_path.clone(),
        }
    }

    /// Installs the subscriber, failing if a global one is already set.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let (writer, missing_path) = self.writer();

        let layer = fmt::layer()
            .with_writer(writer)
            .with_span_events(self.span_events.to_fmt_span())
            .with_target(true)
            .with_thread_ids(self.thread_ids)
            .with_file(self.file_location)
            .with_line_number(self.file_location);
        let layer = match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Full => layer.boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
        };

        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()?;

        if missing_path {
            warn!("File output requested but no file path configured, logging to stdout");
        }
        Ok(())
    }

    /// `RUST_LOG` replaces the base level when set; directives are added on top.
    fn build_filter(&self) -> EnvFilter {
        let base = self.level.to_string().to_lowercase();
        let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base));
        for directive in &self.directives {
            if let Ok(d) = directive.parse() {
                filter = filter.add_directive(d);
            }
        }
        filter
    }

    /// Returns the writer and whether file output fell back to stdout.
    fn writer(&self) -> (BoxMakeWriter, bool) {
        match (self.output, &self.file_path) {
            (LogOutput::Stdout, _) => (BoxMakeWriter::new(std::io::stdout), false),
            (LogOutput::Stderr, _) => (BoxMakeWriter::new(std::io::stderr), false),
            (LogOutput::File, Some(path)) => {
                let (dir, name) = split_log_path(path);
                (
                    BoxMakeWriter::new(tracing_appender::rolling::never(dir, name)),
                    false,
                )
            }
            (LogOutput::File, None) => (BoxMakeWriter::new(std::io::stdout), true),
        }
    }
}

/// Splits a log file path into the appender's directory and file name.
fn split_log_path(path: &Path) -> (&Path, &OsStr) {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(FALLBACK_FILE_NAME));
    (dir, name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;
    use fmt::format::FmtSpan;

    #[test]
    fn test_span_events_to_fmt_span() {
        assert_eq!(SpanEvents::default().to_fmt_span(), FmtSpan::NONE);

        let lifecycle = SpanEvents {
            new: true,
            close: true,
            ..Default::default()
        };
        assert_eq!(lifecycle.to_fmt_span(), FmtSpan::NEW | FmtSpan::CLOSE);

        let all = SpanEvents {
            new: true,
            enter: true,
            exit: true,
            close: true,
        };
        assert_eq!(all.to_fmt_span(), FmtSpan::FULL);
    }

    #[test]
    fn test_from_config() {
        let mut config = LoggingConfig {
            level: LogLevel::Debug,
            output: LogOutput::Stderr,
            file_location: true,
            span_events: SpanEventConfig {
                close: true,
                ..Default::default()
            },
            ..Default::default()
        };
        config
            .filters
            .insert("tether_framework".into(), "TRACE".into());

        let builder = LoggingBuilder::from_config(&config);

        assert_eq!(builder.level, tracing::Level::DEBUG);
        assert_eq!(builder.output, LogOutput::Stderr);
        assert!(builder.file_location);
        assert!(!builder.thread_ids);
        assert_eq!(
            builder.span_events,
            SpanEvents {
                close: true,
                ..Default::default()
            }
        );
        assert_eq!(builder.directives, vec!["tether_framework=trace"]);
    }

    #[test]
    fn test_file_output_without_path_falls_back() {
        let config = LoggingConfig {
            output: LogOutput::File,
            ..Default::default()
        };
        let (_, missing_path) = LoggingBuilder::from_config(&config).writer();
        assert!(missing_path);

        let config = LoggingConfig {
            output: LogOutput::Stdout,
            ..Default::default()
        };
        let (_, missing_path) = LoggingBuilder::from_config(&config).writer();
        assert!(!missing_path);
    }

    #[test]
    fn test_split_log_path() {
        assert_eq!(
            split_log_path(Path::new("logs/app.log")),
            (Path::new("logs"), OsStr::new("app.log"))
        );
        assert_eq!(
            split_log_path(Path::new("app.log")),
            (Path::new("."), OsStr::new("app.log"))
        );
        assert_eq!(
            split_log_path(Path::new("/")),
            (Path::new("."), OsStr::new(FALLBACK_FILE_NAME))
        );
    }
}
