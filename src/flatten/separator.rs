//! Path rendering strategies
//!
//! A separator turns the path prefix accumulated so far plus the next key into
//! the flat column name used in output rows.

use std::fmt::{self, Display};

/// Joins a path prefix with the next key
pub trait Separator: Send + Sync {
    fn append_to_prefix(&self, prefix: &str, key: &dyn Display) -> String;
}

/// Joins path segments with a literal delimiter, e.g. `"."` gives `cc.dd`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrSeparator(String);

impl StrSeparator {
    pub fn new(delimiter: impl Into<String>) -> Self {
        StrSeparator(delimiter.into())
    }

    pub fn delimiter(&self) -> &str {
        &self.0
    }
}

impl Default for StrSeparator {
    fn default() -> Self {
        StrSeparator::new(".")
    }
}

impl Display for StrSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Separator for StrSeparator {
    fn append_to_prefix(&self, prefix: &str, key: &dyn Display) -> String {
        if prefix.is_empty() {
            return key.to_string();
        }
        format!("{}{}{}", prefix, self.0, key)
    }
}
