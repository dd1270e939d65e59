//! Flat key-value mapping used at the storage boundary.
//!
//! A [`Record`] is a JSON object whose values are scalars only: strings,
//! numbers, booleans or null. List-valued fields travel as JSON text inside a
//! string value. Reading a record never fails: every accessor on
//! [`RecordExt`] substitutes a type-appropriate default for a missing or
//! malformed key, so one bad row cannot block listing the rest.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::time::{self, format_timestamp, parse_timestamp};

pub type Record = Map<String, Value>;

/// An entity that converts losslessly to and from a [`Record`].
pub trait Entity: Sized {
    /// Stable string identity (the `id` column).
    fn id(&self) -> &str;

    fn to_record(&self) -> Record;

    /// Inverse of [`Entity::to_record`]. Missing keys become defaults.
    fn from_record(record: &Record) -> Self;
}

/// Tolerant typed accessors over a [`Record`].
pub trait RecordExt {
    /// String value, or `""` when missing. Numbers are stringified.
    fn text(&self, key: &str) -> String;

    /// String value, or `None` when missing or null.
    fn opt_text(&self, key: &str) -> Option<String>;

    /// Boolean value. Accepts JSON booleans, integers (`0`/non-zero) and the
    /// strings `"true"`/`"1"`. Anything else is `false`.
    fn flag(&self, key: &str) -> bool;

    /// Integer value. Reals are truncated, numeric strings parsed.
    fn opt_int(&self, key: &str) -> Option<i64>;

    /// Timestamp, or the current instant when missing or unparsable.
    fn timestamp(&self, key: &str) -> DateTime<Utc>;

    fn opt_timestamp(&self, key: &str) -> Option<DateTime<Utc>>;

    /// JSON-encoded list of strings. Unparsable text yields an empty collection.
    fn string_list<C: FromIterator<String>>(&self, key: &str) -> C;

    /// Parse a string field into `T`, falling back to `T::default()`.
    fn parse_or_default<T: FromStr + Default>(&self, key: &str) -> T;
}

impl RecordExt for Record {
    fn text(&self, key: &str) -> String {
        match self.get(key) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        }
    }

    fn opt_text(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }

    fn flag(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1"),
            _ => false,
        }
    }

    fn opt_int(&self, key: &str) -> Option<i64> {
        match self.get(key) {
            Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Some(Value::String(s)) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn timestamp(&self, key: &str) -> DateTime<Utc> {
        self.opt_timestamp(key).unwrap_or_else(time::now)
    }

    fn opt_timestamp(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.get(key) {
            Some(Value::String(s)) => parse_timestamp(s),
            _ => None,
        }
    }

    fn string_list<C: FromIterator<String>>(&self, key: &str) -> C {
        let items: Vec<String> = match self.get(key) {
            Some(Value::String(s)) => serde_json::from_str(s).unwrap_or_default(),
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| v.as_str().map(str::to_owned))
                .collect(),
            _ => Vec::new(),
        };
        items.into_iter().collect()
    }

    fn parse_or_default<T: FromStr + Default>(&self, key: &str) -> T {
        self.opt_text(key)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Encode a timestamp for a record value.
pub fn timestamp_value(ts: &DateTime<Utc>) -> Value {
    Value::String(format_timestamp(ts))
}

pub fn opt_timestamp_value(ts: Option<&DateTime<Utc>>) -> Value {
    ts.map_or(Value::Null, timestamp_value)
}

pub fn opt_text_value(s: Option<&str>) -> Value {
    s.map_or(Value::Null, |s| Value::String(s.to_owned()))
}

/// Encode a string collection as JSON text.
pub fn string_list_value<'a>(items: impl IntoIterator<Item = &'a String>) -> Value {
    let items: Vec<&String> = items.into_iter().collect();
    Value::String(serde_json::to_string(&items).unwrap_or_else(|_| "[]".to_string()))
}
