//! Static frames and fixed timestamps used across harnesses.

use chrono::{DateTime, TimeZone, Utc};

/// Fixed reference time so rendered timestamps are stable.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

/// The canonical two-frame scenario: both frames land in group `g1`; only
/// the second carries SQL; `web` is the only tag both share.
pub const END_TO_END_FRAMES: [&str; 2] = [
    "log://api:web:eu\n{\"eos-id\":\"g1\",\"message\":\"begin\"}",
    "log://api:web\n{\"eos-id\":\"g1\",\"message\":\"q\",\"sql\":\"select 1\"}",
];

/// Well-formed header with a schema the client does not handle.
pub const UNKNOWN_SCHEMA_FRAME: &str = "metrics://cpu\n{\"value\":0.5}";

/// Headers that do not match `schema://identifier`.
pub const MALFORMED_FRAMES: &[&str] = &[
    "",
    "\n{}",
    "log:/api\n{}",
    "log//api\n{}",
    "://api\n{}",
    "log://\n{}",
    "log://:web\n{}",
    "123://api\n{}",
];

/// Bodies that are not JSON objects. Each still produces an entry whose
/// message is the raw body.
pub const NON_OBJECT_BODIES: &[&str] = &[
    "plain text line",
    "[1,2,3]",
    "42",
    "\"quoted\"",
    "{\"unterminated\": ",
    "",
];
