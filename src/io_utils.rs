//! Input loading for CDR exports.
//!
//! - **stdin**: the `-` path convention reads from standard input.
//! - **Encoding**: input bytes are decoded via `encoding_rs`, defaulting to
//!   UTF-8.
//! - **Records**: the decoded document must be a JSON object whose records
//!   field (usually `data`) is an array of objects.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use encoding_rs::{Encoding, UTF_8};
use serde_json::Value as JsonValue;

use crate::data::Record;

pub const DEFAULT_RECORDS_FIELD: &str = "data";

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn describe_path(path: Option<&Path>) -> String {
    match path {
        Some(p) if !is_dash(p) => p.display().to_string(),
        _ => "stdout".to_string(),
    }
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn read_input(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let mut reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .with_context(|| format!("Reading input {path:?}"))?;
    decode_bytes(&bytes, encoding)
}

/// Decodes a CDR export document and returns the records under `field`.
pub fn parse_records(text: &str, field: &str) -> Result<Vec<Record>> {
    let document: JsonValue = serde_json::from_str(text).context("Parsing input JSON")?;
    let JsonValue::Object(mut root) = document else {
        return Err(anyhow!("Input JSON must be an object with a '{field}' array"));
    };
    let entries = match root.remove(field) {
        Some(JsonValue::Array(entries)) => entries,
        Some(other) => {
            return Err(anyhow!(
                "Records field '{field}' must be an array, found {}",
                json_kind(&other)
            ));
        }
        None => return Err(anyhow!("Records field '{field}' not found in input")),
    };
    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| match entry {
            JsonValue::Object(map) => Ok(Record::from(map)),
            other => Err(anyhow!(
                "Record {} in '{field}' must be an object, found {}",
                idx + 1,
                json_kind(&other)
            )),
        })
        .collect()
}

pub fn load_records(path: &Path, field: &str, encoding: &'static Encoding) -> Result<Vec<Record>> {
    let text = read_input(path, encoding)?;
    parse_records(&text, field).with_context(|| format!("Loading records from {path:?}"))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
