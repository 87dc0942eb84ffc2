//! Error taxonomy for the ingestion pipeline.
//!
//! None of these errors is allowed to stop the ingestion loop. A
//! [`ParseError`] drops a single frame, a [`TransportError`] becomes a
//! `ConnectionError` notification, and payload decode failures never leave
//! [`crate::entry`] at all.

/// A frame header (or any key source) could not be parsed into a [`crate::Key`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed key {input:?}: expected `schema://identifier[:tag]*`")]
    Malformed { input: String },
    #[error("key source must be a string, got {kind}")]
    NotAString { kind: &'static str },
}

/// Failures reported by a transport or while preparing a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("invalid connection uri: {0}")]
    InvalidUri(#[from] url::ParseError),
    #[error("connection to {uri} failed: {reason}")]
    Connect { uri: String, reason: String },
    #[error("stream error: {0}")]
    Stream(String),
}

/// Errors returned by [`crate::ingest::actor::ServiceHandle`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IngestError {
    #[error("ingestion actor has shut down")]
    ActorStopped,
}
