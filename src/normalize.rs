//! Field normalization for call-detail records.
//!
//! Exported CDR documents carry loosely typed values: billing figures arrive
//! as numbers or as (sometimes quoted) strings, and timestamps arrive in one
//! of several textual layouts. This module turns those into typed values:
//!
//! - [`clean_field`] strips double quotes and surrounding whitespace.
//! - [`normalize_date`] tries RFC-1036, `YYYY-MM-DD`, then
//!   `YYYY-MM-DD HH:MM:SS`, and yields `None` when nothing matches.
//! - [`normalize_number`] picks float or integer by lexical shape.
//! - [`normalize_record`] applies both across the fixed CDR field set.
//!
//! Every field is normalized from its own raw value only, so the functions
//! are safe to run on records in any order and on already-normalized input.

use std::{fmt, sync::OnceLock};

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use log::debug;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::{
    data::{Record, Value},
    rfc1036::parse_header_date,
};

const FLOAT_PATTERN: &str = r"\d+\.\d+";
const ISO_8601_DATE_FORMAT: &str = "%Y-%m-%d";
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Number,
    Date,
}

/// The CDR fields that get normalized, in the order they are processed.
pub const CDR_FIELDS: &[(&str, FieldKind)] = &[
    ("duration_seconds", FieldKind::Number),
    ("billing_seconds", FieldKind::Number),
    ("cost", FieldKind::Number),
    ("datetime", FieldKind::Date),
    ("rfc_1036", FieldKind::Date),
    ("iso_8601", FieldKind::Date),
    ("rate", FieldKind::Number),
    ("reseller_cost", FieldKind::Number),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Integer,
    Float,
}

impl fmt::Display for NumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberKind::Integer => f.write_str("integer"),
            NumberKind::Float => f.write_str("float"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum NormalizeError {
    #[error("{value} has invalid type ({kind})")]
    InvalidType { value: String, kind: &'static str },
    #[error("Failed to parse '{value}' as {expected}: {reason}")]
    NumberParse {
        value: String,
        expected: NumberKind,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("Invalid value in field '{field}'")]
pub struct FieldError {
    pub field: String,
    #[source]
    pub source: NormalizeError,
}

fn float_regex() -> &'static Regex {
    static FLOAT_RE: OnceLock<Regex> = OnceLock::new();
    FLOAT_RE.get_or_init(|| {
        RegexBuilder::new(FLOAT_PATTERN)
            .case_insensitive(true)
            .build()
            .expect("valid float regex")
    })
}

/// Removes every double quote and trims surrounding whitespace.
pub fn clean_field(field: &str) -> String {
    field.replace('"', "").trim().to_string()
}

/// Converts a raw field into a local wall-clock date-time.
///
/// Returns `None` for absent, empty or unrecognised input; an unparseable
/// date is never an error.
pub fn normalize_date(field: &Value) -> Option<NaiveDateTime> {
    if let Value::DateTime(dt) = field {
        return Some(*dt);
    }
    let cleaned = clean_field(field.as_text()?);
    if cleaned.is_empty() {
        return None;
    }
    let parsed = parse_rfc_1036(&cleaned)
        .or_else(|| parse_iso_8601_date(&cleaned))
        .or_else(|| parse_naive_datetime(&cleaned));
    if parsed.is_none() {
        debug!("Skipping unrecognised date '{cleaned}'");
    }
    parsed
}

fn parse_rfc_1036(value: &str) -> Option<NaiveDateTime> {
    let parsed = parse_header_date(value)?;
    match parsed.offset {
        Some(offset) => offset
            .from_local_datetime(&parsed.datetime)
            .single()
            .map(|dt| dt.with_timezone(&Local).naive_local()),
        None => Some(parsed.datetime),
    }
}

fn parse_iso_8601_date(value: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(value, ISO_8601_DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_naive_datetime(value: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(value, NAIVE_DATETIME_FORMAT).ok()
}

/// Converts a raw field into an integer or float value.
///
/// Numeric input is returned as-is and other falsy input (absent, empty)
/// yields integer zero. Strings are cleaned, then parsed as a float when they
/// contain a `digits.digits` run anywhere and as an integer otherwise; the
/// whole cleaned string is always what gets parsed.
///
/// Numeric zero (including `0.0`) is kept as given rather than coerced to
/// integer zero, so a second pass over a normalized record changes nothing.
pub fn normalize_number(field: &Value) -> Result<Value, NormalizeError> {
    if field.is_numeric() {
        return Ok(field.clone());
    }
    if field.is_falsy() {
        return Ok(Value::Integer(0));
    }
    let Some(text) = field.as_text() else {
        return Err(NormalizeError::InvalidType {
            value: field.as_display(),
            kind: field.kind(),
        });
    };

    let cleaned = clean_field(text);
    if cleaned.is_empty() {
        return Ok(Value::Integer(0));
    }

    if float_regex().is_match(&cleaned) {
        cleaned
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|err| NormalizeError::NumberParse {
                value: cleaned.clone(),
                expected: NumberKind::Float,
                reason: err.to_string(),
            })
    } else {
        cleaned
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|err| NormalizeError::NumberParse {
                value: cleaned.clone(),
                expected: NumberKind::Integer,
                reason: err.to_string(),
            })
    }
}

/// Normalizes every known CDR field the record carries, in place.
///
/// Fields the record lacks are left out rather than filled in. Stops at the
/// first numeric failure.
pub fn normalize_record(record: &mut Record) -> Result<(), FieldError> {
    for (name, kind) in CDR_FIELDS {
        let Some(slot) = record.get_mut(name) else {
            continue;
        };
        *slot = match kind {
            FieldKind::Number => normalize_number(slot).map_err(|source| FieldError {
                field: (*name).to_string(),
                source,
            })?,
            FieldKind::Date => normalize_date(slot).map_or(Value::Null, Value::DateTime),
        };
    }
    Ok(())
}
