//! flatten and unflatten commands - Convert between nested JSON and path/value pairs

use std::io::Read;
use std::path::Path;

use anyhow::{Context as _, Result};
use serde_json::Value;

use super::print_json;
use crate::codec;

/// Flatten a JSON document into `{ "a.b[0]": leaf }` pairs.
pub fn flatten(file: Option<&Path>, compact: bool) -> Result<()> {
    let input = read_json(file)?;
    print_json(&Value::Object(codec::flatten(&input)), compact)
}

/// Rebuild a JSON document from path/value pairs.
///
/// Accepts either an object of pairs or a meta list `[{ "key", "value" }]`.
pub fn unflatten(file: Option<&Path>, compact: bool) -> Result<()> {
    let input = read_json(file)?;
    let output = match &input {
        Value::Array(entries) => codec::unflatten(entries.iter().filter_map(|entry| {
            let key = entry.get("key")?.as_str()?;
            Some((key.to_string(), entry.get("value").cloned().unwrap_or(Value::Null)))
        })),
        other => codec::unflatten_value(other),
    };
    print_json(&output, compact)
}

fn read_json(file: Option<&Path>) -> Result<Value> {
    let raw = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&raw).context("Input is not valid JSON")
}
