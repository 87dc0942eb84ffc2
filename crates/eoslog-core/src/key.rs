//! Frame keys: the `schema://identifier[:tag]*` header line of every frame.
//!
//! ```text
//! log://billing-api:web:eu-west
//! └┬┘   └────┬────┘ └──┬──┘└──┬──┘
//! schema  identifier  tag    tag
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::error::ParseError;

/// Schema handled by the ingestion pipeline; everything else is reported and dropped.
pub const LOG_SCHEMA: &str = "log";

/// Identifier of the key used for the client's own diagnostics.
pub const INTERNAL_IDENTIFIER: &str = "eos";

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]+)://([^:]+)").expect("key pattern must be a valid regex")
});

/// A parsed frame key. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Key {
    schema: String,
    identifier: String,
    tags: Vec<String>,
}

impl Key {
    /// Parse a key source.
    ///
    /// The schema is matched case-insensitively and stored lowercased. Tags are
    /// whatever follows the identifier, trimmed and split on `:` with empty
    /// tokens dropped; order and duplicates are kept.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let caps = KEY_PATTERN
            .captures(source)
            .ok_or_else(|| ParseError::Malformed {
                input: source.to_string(),
            })?;

        // Group 0 always exists on a successful match.
        let prefix_len = caps.get(0).map_or(0, |m| m.end());
        let tags = source[prefix_len..]
            .trim()
            .split(':')
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            schema: caps[1].to_ascii_lowercase(),
            identifier: caps[2].to_string(),
            tags,
        })
    }

    /// Parse a key out of an arbitrary JSON value. Only strings are accepted.
    pub fn from_value(value: &Value) -> Result<Self, ParseError> {
        match value {
            Value::String(source) => Self::parse(source),
            Value::Null => Err(ParseError::NotAString { kind: "null" }),
            Value::Bool(_) => Err(ParseError::NotAString { kind: "bool" }),
            Value::Number(_) => Err(ParseError::NotAString { kind: "number" }),
            Value::Array(_) => Err(ParseError::NotAString { kind: "array" }),
            Value::Object(_) => Err(ParseError::NotAString { kind: "object" }),
        }
    }

    /// The fixed `log://eos` key carried by self-diagnostic entries.
    pub fn internal() -> Self {
        Self {
            schema: LOG_SCHEMA.to_string(),
            identifier: INTERNAL_IDENTIFIER.to_string(),
            tags: Vec::new(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_log(&self) -> bool {
        self.schema == LOG_SCHEMA
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.schema, self.identifier)?;
        for tag in &self.tags {
            write!(f, ":{tag}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
