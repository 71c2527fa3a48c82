use crate::flatten::config::NormalizeConfig;
use crate::flatten::diagnostics::{Diagnostic, DiagnosticKind, Level};
use crate::flatten::row::Row;
use crate::flatten::value::{Primitive, Value};
use std::fmt::Display;

/// Rows produced for one input plus the non-fatal conditions met on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub rows: Vec<Row>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The core normalizer that flattens a value graph into rows
///
/// Every sequence is expanded into alternatives at the same path, and sibling
/// composite fields of a mapping multiply out against each other, so
/// `{"a": [1, 2], "b": [3, 4, 5]}` yields 6 rows.
pub struct Normalizer {
    config: NormalizeConfig,
}

/// Per-call state; keeps the normalizer itself free of mutable state
struct Walk<'a> {
    config: &'a NormalizeConfig,
    diagnostics: Vec<Diagnostic>,
}

impl Normalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Normalizer { config }
    }

    /// Normalize a value into flat rows
    ///
    /// A null root yields no rows. Every other input yields at least one row.
    pub fn normalize(&self, value: &Value) -> Normalized {
        let mut walk = Walk {
            config: &self.config,
            diagnostics: Vec::new(),
        };

        if value.is_null() {
            walk.record(
                Level::Debug,
                DiagnosticKind::NullValue,
                "",
                format_args!("input is null, returning no rows"),
            );
            return Normalized {
                rows: Vec::new(),
                diagnostics: walk.diagnostics,
            };
        }

        let rows = walk.value(value, "", Row::new(), 0);
        Normalized {
            rows,
            diagnostics: walk.diagnostics,
        }
    }

    /// Normalize and drop the diagnostics list
    pub fn rows(&self, value: &Value) -> Vec<Row> {
        self.normalize(value).rows
    }
}

impl<'a> Walk<'a> {
    fn record(&mut self, level: Level, kind: DiagnosticKind, path: &str, args: std::fmt::Arguments<'_>) {
        let message = args.to_string();
        self.config.sink.log(level, format_args!("{}", message));
        self.diagnostics.push(Diagnostic {
            level,
            kind,
            path: path.to_string(),
            message,
        });
    }

    /// Recursively normalize `value` found at `path`, extending `row`
    fn value(&mut self, value: &Value, path: &str, row: Row, depth: usize) -> Vec<Row> {
        if value.is_null() {
            self.record(
                Level::Debug,
                DiagnosticKind::NullValue,
                path,
                format_args!("value at '{}' is null", path),
            );
            return vec![row];
        }

        if self.config.is_ignored(path) {
            self.record(
                Level::Debug,
                DiagnosticKind::Ignored,
                path,
                format_args!("path '{}' is ignored", path),
            );
            return vec![row];
        }

        if self.config.max_depth.exceeded(depth) {
            self.record(
                Level::Warn,
                DiagnosticKind::DepthExceeded,
                path,
                format_args!(
                    "path '{}' at depth {} exceeds max depth {}",
                    path, depth, self.config.max_depth
                ),
            );
            return vec![row];
        }

        match value {
            Value::Primitive(p) => {
                let mut row = row;
                row.insert(path, p.clone());
                vec![row]
            }
            Value::Sequence(items) => self.sequence(items, path, row, depth),
            Value::Mapping(entries) => {
                let fields = entries.iter().map(|(k, v)| (k as &dyn Display, v));
                self.fields(fields, path, row, depth)
            }
            Value::Record(record) => {
                let fields = record.fields.iter().map(|(k, v)| (k as &dyn Display, v));
                self.fields(fields, path, row, depth)
            }
            Value::Unsupported(desc) => {
                self.record(
                    Level::Warn,
                    DiagnosticKind::Unsupported,
                    path,
                    format_args!("unsupported value '{}' at '{}'", desc, path),
                );
                vec![row]
            }
            Value::Null => unreachable!("null values return before dispatch"),
        }
    }

    /// Each element is an alternative at the same path
    fn sequence(&mut self, items: &[Value], path: &str, row: Row, depth: usize) -> Vec<Row> {
        if items.is_empty() {
            return vec![row];
        }

        let mut rows = Vec::new();
        for item in items {
            rows.extend(self.value(item, path, row.clone(), depth + 1));
        }
        rows
    }

    /// Shared by mappings and records: primitives broadcast, composites fan out
    fn fields<'v, I>(&mut self, fields: I, path: &str, row: Row, depth: usize) -> Vec<Row>
    where
        I: Iterator<Item = (&'v dyn Display, &'v Value)>,
    {
        let mut rows = vec![row];

        for (key, child) in fields {
            let child_path = self.config.separator.append_to_prefix(path, key);

            if self.config.is_ignored(&child_path) {
                self.record(
                    Level::Debug,
                    DiagnosticKind::Ignored,
                    &child_path,
                    format_args!("path '{}' is ignored", child_path),
                );
                continue;
            }

            match child {
                Value::Null => {
                    self.record(
                        Level::Warn,
                        DiagnosticKind::NullValue,
                        &child_path,
                        format_args!("field '{}' is null, skipped", child_path),
                    );
                }
                Value::Primitive(p) => broadcast(&mut rows, &child_path, p),
                Value::Sequence(_) | Value::Mapping(_) | Value::Record(_) => {
                    let mut expanded = Vec::with_capacity(rows.len());
                    for row in rows {
                        expanded.extend(self.value(child, &child_path, row, depth + 1));
                    }
                    rows = expanded;
                }
                Value::Unsupported(desc) => {
                    self.record(
                        Level::Warn,
                        DiagnosticKind::Unsupported,
                        &child_path,
                        format_args!("unsupported value '{}' at '{}', skipped", desc, child_path),
                    );
                }
            }
        }

        rows
    }
}

/// Write one field into every row accumulated so far
fn broadcast(rows: &mut [Row], path: &str, value: &Primitive) {
    for row in rows.iter_mut() {
        row.insert(path, value.clone());
    }
}
