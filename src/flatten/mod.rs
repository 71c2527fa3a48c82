//! Flattening - expand nested values into flat key/value rows
//!
//! Every sequence met during traversal becomes a set of alternative rows, and
//! sibling composite fields multiply out against each other, producing a
//! cartesian-product style denormalization of the input.
//!
//! ## Comparing results
//!
//! Row order follows traversal order. Use [`canonicalize`] to get a stable,
//! sorted form when comparing row sets.

pub mod canonical;
pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod row;
pub mod separator;
pub mod value;
pub mod writer;

pub use canonical::{canonicalize, compare_primitives, Canonical, CanonicalError, CanonicalRow};
pub use config::{ConfigError, MaxDepth, NormalizeConfig};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticSink, Level, NullSink, StdSink, TracingSink};
pub use engine::{Normalized, Normalizer};
pub use row::Row;
pub use separator::{Separator, StrSeparator};
pub use value::{Primitive, PrimitiveKind, Record, Value};
pub use writer::RowWriter;
