//! Leveled diagnostics for the normalizer
//!
//! The normalizer never writes to a global logger. It reports through an
//! injected [`DiagnosticSink`] and also collects structured [`Diagnostic`]s
//! that are returned next to the rows. Swapping the sink only changes where
//! messages go, never which rows are produced.

use chrono::{SecondsFormat, Utc};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
#[error("unknown log level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

/// Destination for free-form leveled messages
///
/// Call with `format_args!`:
///
/// ```rust
/// use denorm::flatten::{DiagnosticSink, Level, StdSink};
///
/// let sink = StdSink::new(Level::Info, Vec::new());
/// sink.info(format_args!("normalized {} rows", 3));
/// ```
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, level: Level, args: fmt::Arguments<'_>);

    fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args)
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args)
    }

    fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args)
    }

    fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args)
    }
}

/// Writes `[LEVEL] <RFC3339 timestamp>` followed by the message on its own line
pub struct StdSink<W: Write + Send> {
    min_level: Level,
    writer: Mutex<W>,
}

impl<W: Write + Send> StdSink<W> {
    pub fn new(min_level: Level, writer: W) -> Self {
        StdSink {
            min_level,
            writer: Mutex::new(writer),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl StdSink<std::io::Stdout> {
    pub fn stdout(min_level: Level) -> Self {
        StdSink::new(min_level, std::io::stdout())
    }
}

impl StdSink<std::io::Stderr> {
    pub fn stderr(min_level: Level) -> Self {
        StdSink::new(min_level, std::io::stderr())
    }
}

impl<W: Write + Send> DiagnosticSink for StdSink<W> {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        if level < self.min_level {
            return;
        }
        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Diagnostics must never fail the caller
        let _ = writeln!(writer, "[{}] {}\n{}", level, timestamp, args);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn log(&self, _level: Level, _args: fmt::Arguments<'_>) {}
}

/// Forwards messages to the `tracing` subscriber installed by the host program
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        match level {
            Level::Debug => tracing::debug!("{}", args),
            Level::Info => tracing::info!("{}", args),
            Level::Warn => tracing::warn!("{}", args),
            Level::Error => tracing::error!("{}", args),
        }
    }
}

/// Why a branch stopped early or a value was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    NullValue,
    Ignored,
    DepthExceeded,
    Unsupported,
}

/// A non-fatal condition recorded during one normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub level: Level,
    pub kind: DiagnosticKind,
    /// Flat path at which the condition occurred
    pub path: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(Level::Debug.to_string(), "DEBUG");
        assert_eq!(Level::Info.to_string(), "INFO");
        assert_eq!(Level::Warn.to_string(), "WARN");
        assert_eq!(Level::Error.to_string(), "ERROR");
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("WARN".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("warning".parse::<Level>().unwrap(), Level::Warn);
        assert!("loud".parse::<Level>().is_err());
    }

    #[test]
    fn test_std_sink_format() {
        let sink = StdSink::new(Level::Debug, Vec::new());
        sink.warn(format_args!("skipped {}", "key"));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let mut lines = output.lines();
        let header = lines.next().unwrap();
        assert!(header.starts_with("[WARN] "));

        let timestamp = header.trim_start_matches("[WARN] ");
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
        assert_eq!(lines.next(), Some("skipped key"));
    }

    #[test]
    fn test_std_sink_filters_below_min_level() {
        let sink = StdSink::new(Level::Warn, Vec::new());
        sink.debug(format_args!("hidden"));
        sink.info(format_args!("hidden"));
        sink.error(format_args!("shown"));

        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!output.contains("hidden"));
        assert!(output.starts_with("[ERROR] "));
    }
}
