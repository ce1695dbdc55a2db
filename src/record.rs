//! Submission records and payload normalization.
//!
//! A [`Record`] is an insertion-ordered mapping from field name to string
//! value. Submitted payloads arrive as arbitrary JSON objects and are
//! flattened by [`normalize_payload`] before anything is persisted, so the
//! JSONL log and the CSV mirror always see plain strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A flattened submission: field names mapped to string values, in the
/// order the fields were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Look up a field value. Returns `None` for absent or non-string
    /// values (the latter only occur in hand-edited files).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Look up a field value, falling back to `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Flatten a JSON object into a [`Record`], preserving key order:
///
/// - `null` becomes the empty string
/// - strings pass through unchanged
/// - arrays and objects are serialized to compact JSON (non-ASCII kept
///   verbatim)
/// - numbers and booleans become their JSON text
///
/// Applying this to an already-normalized record is a no-op.
pub fn normalize_payload(payload: &Map<String, Value>) -> Record {
    let mut fields = Map::with_capacity(payload.len());
    for (key, value) in payload {
        fields.insert(key.clone(), Value::String(normalize_value(value)));
    }
    Record(fields)
}

fn normalize_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}
