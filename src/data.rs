use std::fmt;

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::{Map, Value as JsonValue};

pub const DATETIME_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single field of a call-detail record, before or after normalization.
///
/// Decoded JSON lands in `Null`, `Integer`, `Float`, `Text` or `Json`;
/// `DateTime` is only ever produced by the date normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    #[serde(serialize_with = "serialize_datetime")]
    DateTime(NaiveDateTime),
    Json(JsonValue),
}

fn serialize_datetime<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&value.format(DATETIME_DISPLAY_FORMAT))
}

impl Value {
    /// Mirrors loose truthiness: null, zero, the empty string and empty
    /// containers (plus `false`) count as falsy.
    pub fn is_falsy(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Integer(i) => *i == 0,
            Value::Float(f) => *f == 0.0,
            Value::Text(s) => s.is_empty(),
            Value::DateTime(_) => false,
            Value::Json(JsonValue::Bool(b)) => !b,
            Value::Json(JsonValue::Array(items)) => items.is_empty(),
            Value::Json(JsonValue::Object(map)) => map.is_empty(),
            Value::Json(_) => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// The text of a string-like value; `None` for every other variant.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::Json(JsonValue::Bool(_)) => "boolean",
            Value::Json(JsonValue::Array(_)) => "array",
            Value::Json(JsonValue::Object(_)) => "object",
            Value::Json(_) => "json",
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::DateTime(dt) => dt.format(DATETIME_DISPLAY_FORMAT).to_string(),
            Value::Json(json) => json.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::String(s) => Value::Text(s),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Json(JsonValue::Number(n))
                }
            }
            other => Value::Json(other),
        }
    }
}

/// An ordered field-name to value mapping for one call-detail record.
///
/// Field order follows the input document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields
            .iter_mut()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    /// Sets `name`, replacing an existing value in place or appending a new field.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(slot) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(map: Map<String, JsonValue>) -> Self {
        Self {
            fields: map
                .into_iter()
                .map(|(key, value)| (key, Value::from(value)))
                .collect(),
        }
    }
}

impl Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn json_numbers_split_into_integer_and_float() {
        assert_eq!(Value::from(json!(42)), Value::Integer(42));
        assert_eq!(Value::from(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from(json!(null)), Value::Null);
        assert_eq!(Value::from(json!("x")), Value::Text("x".to_string()));
        assert_eq!(Value::from(json!(true)), Value::Json(json!(true)));
    }

    #[test]
    fn falsy_covers_zero_empty_and_false() {
        assert!(Value::Null.is_falsy());
        assert!(Value::Integer(0).is_falsy());
        assert!(Value::Float(0.0).is_falsy());
        assert!(Value::Text(String::new()).is_falsy());
        assert!(Value::Json(json!(false)).is_falsy());
        assert!(Value::Json(json!([])).is_falsy());
        assert!(Value::Json(json!({})).is_falsy());
        assert!(!Value::Text("\"\"".to_string()).is_falsy());
        assert!(!Value::Json(json!(true)).is_falsy());
    }

    #[test]
    fn record_preserves_input_order_and_replaces_in_place() {
        let map = json!({"zeta": 1, "alpha": "a", "mid": null});
        let JsonValue::Object(map) = map else {
            panic!("expected object");
        };
        let mut record = Record::from(map);
        record.insert("alpha", Value::Integer(7));
        let keys: Vec<&str> = record.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(record.get("alpha"), Some(&Value::Integer(7)));
        assert_eq!(record.len(), 3);
    }

    #[test]
    fn record_serializes_datetimes_as_plain_strings() {
        let mut record = Record::new();
        let dt = NaiveDate::from_ymd_opt(2017, 2, 28)
            .unwrap()
            .and_hms_opt(23, 44, 1)
            .unwrap();
        record.insert("datetime", Value::DateTime(dt));
        record.insert("cost", Value::Float(0.5));
        record.insert("rfc_1036", Value::Null);
        let rendered = serde_json::to_string(&record).unwrap();
        assert_eq!(
            rendered,
            r#"{"datetime":"2017-02-28 23:44:01","cost":0.5,"rfc_1036":null}"#
        );
    }
}
