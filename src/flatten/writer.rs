use crate::flatten::canonical::canonicalize;
use crate::flatten::row::Row;
use crate::flatten::value::Primitive;
use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use std::io::Write;

/// Writes rows as JSON Lines, one object per row
pub struct RowWriter<W: Write> {
    writer: W,
    source_field: Option<String>,
    written: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(writer: W) -> Self {
        RowWriter {
            writer,
            source_field: None,
            written: 0,
        }
    }

    /// Tag every row with the input it came from under `field`, e.g. `_source`
    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        self.source_field = Some(field.into());
        self
    }

    /// Number of rows written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn write_rows(&mut self, rows: &[Row], source: Option<&str>) -> Result<()> {
        for row in rows {
            let pairs = row.iter().map(|(k, v)| (k.clone(), v.clone()));
            self.write_pairs(pairs, source)?;
        }
        Ok(())
    }

    /// Write rows in canonical order with keys sorted
    pub fn write_canonical(&mut self, rows: &[Row], source: Option<&str>) -> Result<()> {
        let canonical = canonicalize(rows).context("Failed to canonicalize rows")?;
        for pairs in canonical {
            self.write_pairs(pairs.into_iter(), source)?;
        }
        Ok(())
    }

    fn write_pairs<I>(&mut self, pairs: I, source: Option<&str>) -> Result<()>
    where
        I: Iterator<Item = (String, Primitive)>,
    {
        let mut data = Map::new();
        for (key, value) in pairs {
            // JSON has no NaN or infinity; serde_json would silently emit null
            if let Primitive::Float(x) = &value {
                if !x.is_finite() {
                    bail!("Cannot write non-finite float {} for field '{}'", x, key);
                }
            }
            let value = serde_json::to_value(&value).context("Failed to serialize value")?;
            data.insert(key, value);
        }

        if let (Some(field), Some(source)) = (&self.source_field, source) {
            if data.contains_key(field) {
                bail!(
                    "Row already has a field named '{}'; choose another source field",
                    field
                );
            }
            data.insert(field.clone(), Value::String(source.to_string()));
        }

        let json = serde_json::to_string(&data).context("Failed to serialize row")?;
        writeln!(self.writer, "{}", json).context("Failed to write row")?;
        self.written += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush writer")
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
