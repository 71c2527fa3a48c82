//! # Denorm - Nested Data Flattening
//!
//! Normalizes arbitrary nested data (scalars, sequences, mappings and records)
//! into flat key/value rows, one row per combination of values reachable by
//! expanding every sequence along the way.
//!
//! ## Quick Start
//!
//! ```rust
//! use denorm::flatten::{canonicalize, NormalizeConfig, Normalizer, NullSink, Value};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = Value::from(json!({
//!     "aa": "a",
//!     "bb": [1, 2],
//!     "cc": {"dd": 1, "ee": 2}
//! }));
//!
//! let config = NormalizeConfig::default().with_sink(NullSink);
//! let normalizer = Normalizer::new(config);
//! let result = normalizer.normalize(&data);
//!
//! // {aa: a, bb: 1, cc.dd: 1, cc.ee: 2}
//! // {aa: a, bb: 2, cc.dd: 1, cc.ee: 2}
//! assert_eq!(result.rows.len(), 2);
//!
//! let canonical = canonicalize(&result.rows)?;
//! assert_eq!(canonical[0][1].0, "bb");
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

pub mod flatten;

// Re-export commonly used types for convenience
pub use flatten::{
    canonicalize, MaxDepth, NormalizeConfig, Normalized, Normalizer, Row, RowWriter, StrSeparator, Value,
};

/// Main entry point: normalize a stream of newline-delimited JSON records
///
/// Blank lines are skipped. Returns the number of rows written.
pub fn normalize_json<R: BufRead, W: Write>(
    reader: R,
    writer: &mut RowWriter<W>,
    normalizer: &Normalizer,
) -> Result<usize> {
    let before = writer.written();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.context("Failed to read line")?;
        if line.trim().is_empty() {
            continue;
        }
        let json: serde_json::Value = serde_json::from_str(&line)
            .with_context(|| format!("Failed to parse JSON on line {}", idx + 1))?;

        let result = normalizer.normalize(&Value::from(json));
        let source = (idx + 1).to_string();
        writer.write_rows(&result.rows, Some(&source))?;
    }

    writer.flush()?;
    Ok(writer.written() - before)
}
