//! The seam between the ingestion service and a concrete transport.
//!
//! A [`Connector`] opens a connection for a [`SessionId`] and returns a
//! [`TransportHandle`] used to close it. The transport reports back
//! asynchronously by sending `(SessionId, TransportEvent)` pairs on a
//! [`TransportSink`]; the session id lets the service discard events from a
//! connection it has already replaced.

use std::fmt;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use url::Url;

use crate::error::TransportError;

/// Monotonic connection-attempt counter. `SessionId::default()` means "never connected".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Something that happened on a transport.
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    Open,
    Error(TransportError),
    Close,
    /// One text frame.
    Message(String),
}

pub type TransportSink = mpsc::UnboundedSender<(SessionId, TransportEvent)>;
pub type TransportEvents = mpsc::UnboundedReceiver<(SessionId, TransportEvent)>;

/// Create the channel a transport reports on.
pub fn transport_channel() -> (TransportSink, TransportEvents) {
    mpsc::unbounded_channel()
}

/// A live (or pending) connection.
pub trait TransportHandle: Send {
    /// Close the connection. Must be safe to call on an already-closed transport.
    fn close(&mut self);
}

/// Opens transports. Opening never fails synchronously; failures arrive as
/// [`TransportEvent::Error`] followed by [`TransportEvent::Close`].
pub trait Connector: Send {
    fn open(&mut self, session: SessionId, uri: &Url) -> Box<dyn TransportHandle>;
}

// ---------------------------------------------------------------------------
// Connection parameters
// ---------------------------------------------------------------------------

/// Opaque credential triple forwarded to the log source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub tag: String,
    pub realm: String,
    pub secret: String,
}

/// Where to connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionParams {
    pub server: String,
    pub port: u16,
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl ConnectionParams {
    pub fn new(server: impl Into<String>, port: u16) -> Self {
        Self {
            server: server.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Build the `ws://server:port/` URI, with credentials as query pairs.
    pub fn uri(&self) -> Result<Url, TransportError> {
        let mut uri = Url::parse(&format!("ws://{}:{}/", self.server, self.port))?;
        if let Some(credentials) = &self.credentials {
            uri.query_pairs_mut()
                .append_pair("tag", &credentials.tag)
                .append_pair("realm", &credentials.realm)
                .append_pair("secret", &credentials.secret);
        }
        Ok(uri)
    }
}

/// Renders `server:port`; credentials are never printed.
impl fmt::Display for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.server, self.port)
    }
}
