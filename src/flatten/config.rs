use crate::flatten::diagnostics::{DiagnosticSink, Level, StdSink};
use crate::flatten::separator::{Separator, StrSeparator};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid max depth '{0}': expected a non-negative integer or 'unbounded'")]
    InvalidMaxDepth(String),
}

/// How many composite levels below the root the normalizer will descend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxDepth {
    #[default]
    Unbounded,
    Limited(usize),
}

impl MaxDepth {
    /// True when a branch at `depth` must be pruned
    pub fn exceeded(&self, depth: usize) -> bool {
        match self {
            MaxDepth::Unbounded => false,
            MaxDepth::Limited(max) => depth > *max,
        }
    }
}

impl fmt::Display for MaxDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaxDepth::Unbounded => f.write_str("unbounded"),
            MaxDepth::Limited(max) => write!(f, "{}", max),
        }
    }
}

impl FromStr for MaxDepth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "unbounded" | "inf" | "infinity" | "-1" => Ok(MaxDepth::Unbounded),
            other => other
                .parse::<usize>()
                .map(MaxDepth::Limited)
                .map_err(|_| ConfigError::InvalidMaxDepth(s.to_string())),
        }
    }
}

impl From<usize> for MaxDepth {
    fn from(max: usize) -> Self {
        MaxDepth::Limited(max)
    }
}

/// Configuration for the normalization process
///
/// Immutable once handed to a [`Normalizer`](crate::flatten::Normalizer); it
/// may be shared read-only between threads.
#[derive(Clone)]
pub struct NormalizeConfig {
    /// Maximum composite depth to descend (root = 0)
    pub max_depth: MaxDepth,

    /// Exact flat paths whose subtrees are dropped
    pub ignore: HashSet<String>,

    /// Renders nested paths into flat column names
    pub separator: Arc<dyn Separator>,

    /// Receives every diagnostic as it happens
    pub sink: Arc<dyn DiagnosticSink>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        NormalizeConfig {
            max_depth: MaxDepth::Unbounded,
            ignore: HashSet::new(),
            separator: Arc::new(StrSeparator::default()),
            sink: Arc::new(StdSink::stderr(Level::Warn)),
        }
    }
}

impl NormalizeConfig {
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    pub fn with_shared_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn with_max_depth(mut self, max_depth: impl Into<MaxDepth>) -> Self {
        self.max_depth = max_depth.into();
        self
    }

    pub fn with_ignore<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_separator(mut self, separator: impl Separator + 'static) -> Self {
        self.separator = Arc::new(separator);
        self
    }

    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore.contains(path)
    }
}

impl fmt::Debug for NormalizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizeConfig")
            .field("max_depth", &self.max_depth)
            .field("ignore", &self.ignore)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_depth_parsing() {
        assert_eq!("unbounded".parse::<MaxDepth>(), Ok(MaxDepth::Unbounded));
        assert_eq!("-1".parse::<MaxDepth>(), Ok(MaxDepth::Unbounded));
        assert_eq!("3".parse::<MaxDepth>(), Ok(MaxDepth::Limited(3)));
        assert_eq!(
            "deep".parse::<MaxDepth>(),
            Err(ConfigError::InvalidMaxDepth("deep".to_string()))
        );
    }

    #[test]
    fn test_max_depth_exceeded() {
        assert!(!MaxDepth::Unbounded.exceeded(usize::MAX));
        assert!(!MaxDepth::Limited(2).exceeded(2));
        assert!(MaxDepth::Limited(2).exceeded(3));
        assert!(MaxDepth::Limited(0).exceeded(1));
    }

    #[test]
    fn test_builder_methods() {
        let config = NormalizeConfig::default()
            .with_max_depth(4)
            .with_ignore(["a.b", "c"])
            .with_separator(StrSeparator::new("_"));

        assert_eq!(config.max_depth, MaxDepth::Limited(4));
        assert!(config.is_ignored("a.b"));
        assert!(!config.is_ignored("a"));
        assert_eq!(config.separator.append_to_prefix("x", &"y"), "x_y");
    }
}
