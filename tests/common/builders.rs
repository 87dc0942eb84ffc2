//! Test builders: ergonomic constructors for frames and `LogEntry` values.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, Utc};
use eoslog_core::{Key, LogEntry, Payload};
use serde_json::{Map, Value};

use super::fixtures::t0;

// ---------------------------------------------------------------------------
// FrameBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for wire frames and the entries they produce.
///
/// # Example
///
/// ```rust
/// let frame = FrameBuilder::log("api")
///     .tags(["web", "eu"])
///     .group("g1")
///     .sql("select 1")
///     .frame();
/// ```
pub struct FrameBuilder {
    schema: String,
    identifier: String,
    tags: Vec<String>,
    body: Map<String, Value>,
    raw_body: Option<String>,
    at: DateTime<Utc>,
}

impl FrameBuilder {
    /// A `log://<identifier>` frame with an empty JSON object body.
    pub fn log(identifier: &str) -> Self {
        Self::with_schema("log", identifier)
    }

    pub fn with_schema(schema: &str, identifier: &str) -> Self {
        Self {
            schema: schema.to_string(),
            identifier: identifier.to_string(),
            tags: Vec::new(),
            body: Map::new(),
            raw_body: None,
            at: t0(),
        }
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn group(self, id: &str) -> Self {
        self.field("eos-id", id)
    }

    pub fn message(self, message: &str) -> Self {
        self.field("message", message)
    }

    pub fn exception(self, text: &str) -> Self {
        self.field("exception", text)
    }

    pub fn sql(self, text: &str) -> Self {
        self.field("sql", text)
    }

    /// Sets both `time` (presence) and `perf` (amount).
    pub fn timed(self, perf: f64) -> Self {
        self.field("time", perf).field("perf", perf)
    }

    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.body.insert(key.to_string(), value.into());
        self
    }

    /// Replace the JSON body with arbitrary text.
    pub fn raw_body(mut self, body: &str) -> Self {
        self.raw_body = Some(body.to_string());
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = at;
        self
    }

    pub fn header(&self) -> String {
        let mut header = format!("{}://{}", self.schema, self.identifier);
        for tag in &self.tags {
            header.push(':');
            header.push_str(tag);
        }
        header
    }

    pub fn body(&self) -> String {
        match &self.raw_body {
            Some(raw) => raw.clone(),
            None => Value::Object(self.body.clone()).to_string(),
        }
    }

    /// `<header>\n<body>` as sent on the wire.
    pub fn frame(&self) -> String {
        format!("{}\n{}", self.header(), self.body())
    }

    /// The entry the frame would produce, with the builder's timestamp.
    pub fn build(&self) -> LogEntry {
        let key = Key::parse(&self.header()).expect("builder header must parse");
        LogEntry::with_received_at(key, Payload::Text(self.body()), self.at)
    }
}
