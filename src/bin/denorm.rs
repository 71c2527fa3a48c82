//! denorm: Flatten nested JSON into denormalized rows
//!
//! Usage:
//!   # Read one JSON document from a file, rows to stdout
//!   denorm data.json
//!
//!   # Read newline-delimited JSON from stdin
//!   cat events.jsonl | denorm --ndjson
//!
//!   # Normalize every .json file under a directory, tagging rows with their file
//!   denorm --walk ./assets --separator _ --ignore meta.raw,debug
//!
//!   # Stable output for diffing
//!   denorm --canonical --max-depth 3 data.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::{Context, Result};
use clap::Parser;
use denorm::flatten::{
    DiagnosticSink, Level, MaxDepth, NormalizeConfig, Normalizer, RowWriter, StdSink, StrSeparator,
    TracingSink, Value,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(name = "denorm")]
#[command(about = "Flatten nested JSON into denormalized key/value rows", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE", conflicts_with = "walk")]
    input: Option<PathBuf>,

    /// Process newline-delimited JSON (one JSON document per line)
    #[arg(long)]
    ndjson: bool,

    /// Normalize every .json file under this directory
    #[arg(long, value_name = "DIR")]
    walk: Option<PathBuf>,

    /// Maximum composite depth to descend: a number or "unbounded"
    #[arg(long, default_value = "unbounded")]
    max_depth: MaxDepth,

    /// Separator between path segments
    #[arg(long, default_value = ".")]
    separator: String,

    /// Comma-separated exact paths to drop
    #[arg(long, value_delimiter = ',')]
    ignore: Vec<String>,

    /// Sort pairs and rows into canonical order before writing
    #[arg(long)]
    canonical: bool,

    /// Minimum level for normalization diagnostics
    #[arg(long, default_value = "warn")]
    log_level: Level,

    /// Send diagnostics through tracing instead of the plain console format
    #[arg(long)]
    tracing: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("denorm=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let sink: Arc<dyn DiagnosticSink> = if args.tracing {
        Arc::new(TracingSink)
    } else {
        Arc::new(StdSink::stderr(args.log_level))
    };

    let config = NormalizeConfig::default()
        .with_shared_sink(sink)
        .with_max_depth(args.max_depth)
        .with_ignore(args.ignore.iter().map(|s| s.trim().to_string()))
        .with_separator(StrSeparator::new(args.separator.clone()));
    debug!(?config, "normalizer configured");
    let normalizer = Normalizer::new(config);
    let stdout = std::io::stdout();
    let mut writer = RowWriter::new(stdout.lock());

    if let Some(dir) = &args.walk {
        writer = writer.with_source_field("_source");
        process_dir(dir, &normalizer, args.canonical, &mut writer)?;
    } else {
        let reader: Box<dyn Read> = match &args.input {
            Some(path) => Box::new(BufReader::new(
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
            )),
            None => Box::new(std::io::stdin()),
        };

        if args.ndjson {
            writer = writer.with_source_field("_line");
            process_ndjson(reader, &normalizer, args.canonical, &mut writer)?;
        } else {
            let value = read_document(reader)?;
            write_value(&normalizer, &value, args.canonical, None, &mut writer)?;
        }
    }

    writer.flush()?;
    info!(rows = writer.written(), "done");
    Ok(())
}

/// Parse one JSON document using SIMD-accelerated parsing when possible
fn read_document(reader: Box<dyn Read>) -> Result<Value> {
    let mut content = Vec::new();
    let mut buf_reader = BufReader::new(reader);
    buf_reader.read_to_end(&mut content).context("Failed to read input")?;

    // simd-json parses in place, so keep the original bytes for the fallback
    let mut scratch = content.clone();
    let json: serde_json::Value = match simd_json::serde::from_slice(&mut scratch) {
        Ok(json) => json,
        Err(err) => {
            debug!(%err, "simd-json rejected input, falling back to serde_json");
            serde_json::from_slice(&content).context("Failed to parse JSON")?
        }
    };
    Ok(Value::from(json))
}

fn process_ndjson<W: Write>(
    reader: Box<dyn Read>,
    normalizer: &Normalizer,
    canonical: bool,
    writer: &mut RowWriter<W>,
) -> Result<()> {
    for (idx, line) in BufReader::new(reader).lines().enumerate() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let json: serde_json::Value = serde_json::from_str(line)
            .with_context(|| format!("Failed to parse JSON on line {}", idx + 1))?;
        let source = (idx + 1).to_string();
        write_value(normalizer, &Value::from(json), canonical, Some(&source), writer)?;
    }
    Ok(())
}

/// Normalize every `.json` file under `dir`; unreadable files are skipped with a warning
fn process_dir<W: Write>(
    dir: &Path,
    normalizer: &Normalizer,
    canonical: bool,
    writer: &mut RowWriter<W>,
) -> Result<()> {
    let mut paths = Vec::new();
    collect_json_files(dir, &mut paths)?;
    paths.sort();
    info!(files = paths.len(), dir = %dir.display(), "walking directory");

    for path in paths {
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) => {
                warn!(path = %path.display(), %err, "skipping unreadable file");
                continue;
            }
        };
        let value = match read_document(Box::new(file)) {
            Ok(value) => value,
            Err(err) => {
                warn!(path = %path.display(), err = %err, "skipping invalid JSON");
                continue;
            }
        };
        let source = path.display().to_string();
        write_value(normalizer, &value, canonical, Some(&source), writer)?;
    }
    Ok(())
}

fn collect_json_files(dir: &Path, paths: &mut Vec<PathBuf>) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry.context("Failed to read directory entry")?.path();
        if path.is_dir() {
            collect_json_files(&path, paths)?;
        } else if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    Ok(())
}

fn write_value<W: Write>(
    normalizer: &Normalizer,
    value: &Value,
    canonical: bool,
    source: Option<&str>,
    writer: &mut RowWriter<W>,
) -> Result<()> {
    let result = normalizer.normalize(value);
    debug!(
        rows = result.rows.len(),
        diagnostics = result.diagnostics.len(),
        source = source.unwrap_or("-"),
        "normalized document"
    );

    if canonical {
        writer.write_canonical(&result.rows, source)
    } else {
        writer.write_rows(&result.rows, source)
    }
}
