//! Normalize a handful of hand-built values and print the resulting rows
//!
//! Run with: cargo run --example simple

use denorm::flatten::{Level, MaxDepth, NormalizeConfig, Normalizer, Record, StdSink, StrSeparator, Value};

fn samples() -> Vec<Value> {
    vec![
        Value::from(1),
        Value::from("foo"),
        Value::from(vec![Value::from(1), Value::from("foo"), Value::from("baz")]),
        Value::mapping([("key", "base")]),
        Value::mapping([
            ("key", Value::from("base")),
            ("list", Value::from(vec![Value::from(1), Value::from("99")])),
        ]),
        Value::from(
            Record::new("Order")
                .field("id", 42u64)
                .field("paid", true)
                .field(
                    "lines",
                    vec![
                        Record::new("Line").field("sku", "A-1").field("qty", 2),
                        Record::new("Line").field("sku", "B-7").field("qty", 1),
                    ],
                ),
        ),
    ]
}

fn main() -> anyhow::Result<()> {
    let config = NormalizeConfig::default()
        .with_sink(StdSink::stdout(Level::Debug))
        .with_max_depth(MaxDepth::Unbounded)
        .with_ignore(Vec::<String>::new())
        .with_separator(StrSeparator::new("_"));
    let normalizer = Normalizer::new(config);

    for value in samples() {
        let result = normalizer.normalize(&value);
        for row in &result.rows {
            println!("{}", serde_json::to_string(row)?);
        }
    }

    Ok(())
}
