//! Log entries: one received message plus everything derived from it.
//!
//! Construction is lenient: a payload that is not valid JSON still produces
//! an entry (with an empty structured body), so one malformed message never
//! stalls the stream.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::key::Key;

/// Group id used when a payload carries no `eos-id`.
pub const DEFAULT_GROUP_ID: &str = "--default--";

/// Structured field that names an entry's group.
pub const GROUP_ID_FIELD: &str = "eos-id";

const MESSAGE_FIELD: &str = "message";
const EXCEPTION_FIELD: &str = "exception";
const SQL_FIELD: &str = "sql";
const TIME_FIELD: &str = "time";
const PERF_FIELD: &str = "perf";

/// The payload of a message as it was received.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Body text of a wire frame.
    Text(String),
    /// A value that was already structured (self-diagnostics).
    Structured(Value),
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.write_str(text),
            Payload::Structured(value) => write!(f, "{value}"),
        }
    }
}

/// One received log message.
///
/// Everything except [`LogEntry::index`] is fixed at construction. The index is
/// the entry's 1-based position inside its group and is stamped by
/// [`crate::LogGroup::stamp_latest`]; it is `0` until then.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    key: Key,
    raw: Payload,
    structured: Map<String, Value>,
    message: String,
    group_id: String,
    received_at: DateTime<Utc>,
    index: usize,
}

impl LogEntry {
    /// Build an entry stamped with the current wall-clock time.
    pub fn new(key: Key, raw: Payload) -> Self {
        Self::with_received_at(key, raw, Utc::now())
    }

    /// Build an entry with an explicit receive time.
    pub fn with_received_at(key: Key, raw: Payload, received_at: DateTime<Utc>) -> Self {
        let structured = structure(&raw);
        let message = message_of(&structured, &raw);
        let group_id = group_id_of(&structured);
        Self {
            key,
            raw,
            structured,
            message,
            group_id,
            received_at,
            index: 0,
        }
    }

    pub fn key(&self) -> &Key {
        &self.key
    }

    pub fn raw(&self) -> &Payload {
        &self.raw
    }

    pub fn structured(&self) -> &Map<String, Value> {
        &self.structured
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    pub fn has_exception(&self) -> bool {
        has_field(&self.structured, EXCEPTION_FIELD)
    }

    pub fn has_sql(&self) -> bool {
        has_field(&self.structured, SQL_FIELD)
    }

    /// True when the payload carries a `time` field.
    ///
    /// Note that the value folded into a group's performance total is read
    /// from `perf`, not `time`; see [`LogEntry::perf`].
    pub fn has_performance_data(&self) -> bool {
        has_field(&self.structured, TIME_FIELD)
    }

    /// Numeric `perf` field, accepting numbers and numeric strings.
    pub fn perf(&self) -> Option<f64> {
        match self.structured.get(PERF_FIELD)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// True for the client's own diagnostics (`log://eos`).
    pub fn is_internal(&self) -> bool {
        self.key == Key::internal()
    }
}

// ---------------------------------------------------------------------------
// Derivation helpers
// ---------------------------------------------------------------------------

/// A field counts as present when it exists and is not `null`.
fn has_field(structured: &Map<String, Value>, name: &str) -> bool {
    structured.get(name).is_some_and(|v| !v.is_null())
}

fn structure(raw: &Payload) -> Map<String, Value> {
    match raw {
        Payload::Text(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => map,
            Ok(other) => {
                tracing::debug!(kind = json_kind(&other), "payload is JSON but not an object");
                Map::new()
            }
            Err(err) => {
                tracing::debug!(error = %err, "payload is not JSON, structured body left empty");
                Map::new()
            }
        },
        Payload::Structured(Value::Object(map)) => map.clone(),
        Payload::Structured(_) => Map::new(),
    }
}

fn message_of(structured: &Map<String, Value>, raw: &Payload) -> String {
    match structured.get(MESSAGE_FIELD) {
        Some(Value::String(message)) => message.clone(),
        Some(Value::Null) | None => raw.to_string(),
        Some(other) => other.to_string(),
    }
}

fn group_id_of(structured: &Map<String, Value>) -> String {
    match structured.get(GROUP_ID_FIELD) {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::String(_)) | Some(Value::Null) | None => DEFAULT_GROUP_ID.to_string(),
        Some(other) => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
