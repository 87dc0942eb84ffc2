//! Ingestion service: connection state machine, frame dispatch and grouping.
//!
//! # States
//!
//! ```text
//!              connect()            Open
//! Disconnected ─────────► Connecting ─────► Connected
//!      ▲                      │                 │
//!      └──────────────────────┴─────────────────┘
//!           Close / disconnect() / connect()
//! ```
//!
//! Each transport transition has its own handler. Handlers only touch the
//! service's own state and publish through the embedded [`Notifier`]; they
//! never fail, so a bad frame or a dead connection cannot stop ingestion.
//!
//! [`IngestionService`] is synchronous and single-owner. Run it inside
//! [`actor::spawn`] to share it between the UI and a transport.

pub mod actor;
pub mod transport;

use std::collections::hash_map::{self, HashMap};
use std::fmt;

use serde_json::{json, Map, Value};

use crate::entry::{LogEntry, Payload, GROUP_ID_FIELD};
use crate::error::TransportError;
use crate::group::{GroupSummary, LogGroup};
use crate::key::{Key, INTERNAL_IDENTIFIER};
use crate::notify::{Notification, NotificationKind, Notifier};

pub use transport::{
    transport_channel, ConnectionParams, Connector, Credentials, SessionId, TransportEvent,
    TransportEvents, TransportHandle, TransportSink,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Connected => write!(f, "connected"),
        }
    }
}

pub struct IngestionService {
    state: ConnectionState,
    session: SessionId,
    transport: Option<Box<dyn TransportHandle>>,
    connector: Box<dyn Connector>,
    groups: HashMap<String, LogGroup>,
    /// Group ids in creation order.
    group_order: Vec<String>,
    notifier: Notifier,
}

impl IngestionService {
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            session: SessionId::default(),
            transport: None,
            connector: Box::new(connector),
            groups: HashMap::new(),
            group_order: Vec::new(),
            notifier: Notifier::new(),
        }
    }

    pub fn notifier_mut(&mut self) -> &mut Notifier {
        &mut self.notifier
    }

    /// Shorthand for `notifier_mut().on(kind, handler)`.
    pub fn on<F>(&mut self, kind: NotificationKind, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.notifier.on(kind, handler);
        self
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Id of the current (or most recent) connection attempt.
    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn group(&self, id: &str) -> Option<&LogGroup> {
        self.groups.get(id)
    }

    /// Groups in the order they were created.
    pub fn groups(&self) -> impl Iterator<Item = &LogGroup> + '_ {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn group_summaries(&self) -> Vec<GroupSummary> {
        self.groups().map(LogGroup::summary).collect()
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Start a new session, dropping any previous one first.
    ///
    /// An unusable address is reported like a failed connection (self-log plus
    /// `ConnectionError`) and also returned to the caller.
    pub fn connect(&mut self, params: &ConnectionParams) -> Result<SessionId, TransportError> {
        self.disconnect();

        let uri = match params.uri() {
            Ok(uri) => uri,
            Err(err) => {
                tracing::warn!(target = %params, error = %err, "cannot build connection uri");
                self.log_self("Connection failed", Some(json!({ "error": err.to_string() })));
                self.notifier.emit(Notification::ConnectionError);
                return Err(err);
            }
        };

        self.session = self.session.next();
        tracing::debug!(session = %self.session, target = %params, "connecting");
        self.transport = Some(self.connector.open(self.session, &uri));
        self.state = ConnectionState::Connecting;
        Ok(self.session)
    }

    /// Drop the current session, if any. Always reports `Disconnect`, so
    /// calling it repeatedly is harmless.
    pub fn disconnect(&mut self) {
        self.log_self("Disconnecting", None);
        self.notifier.emit(Notification::Disconnect);

        if let Some(mut transport) = self.transport.take() {
            tracing::debug!(session = %self.session, state = %self.state, "closing transport");
            transport.close();
        }
        self.state = ConnectionState::Disconnected;
    }

    /// Forget every group and publish `Cleared`. Connection state is
    /// untouched.
    pub fn clear_groups(&mut self) {
        tracing::debug!(groups = self.groups.len(), "clearing groups");
        self.groups.clear();
        self.group_order.clear();
        self.notifier.emit(Notification::Cleared);
    }

    /// Publish a self-diagnostic and record it as an entry in the `eos` group.
    pub fn log_self(&mut self, message: &str, object: Option<Value>) {
        tracing::info!(target: "eoslog::self", "{message}");
        self.notifier.emit(Notification::Log(message.to_string()));

        let mut payload = match object {
            Some(Value::Object(map)) => {
                self.notifier.emit(Notification::Debug(Value::Object(map.clone())));
                map
            }
            Some(other) => {
                self.notifier.emit(Notification::Debug(other.clone()));
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
            None => Map::new(),
        };
        payload.insert("message".to_string(), Value::String(message.to_string()));
        payload.insert(
            GROUP_ID_FIELD.to_string(),
            Value::String(INTERNAL_IDENTIFIER.to_string()),
        );

        let entry = LogEntry::new(Key::internal(), Payload::Structured(Value::Object(payload)));
        self.add_log_entry(entry);
    }

    // -----------------------------------------------------------------------
    // Transport events
    // -----------------------------------------------------------------------

    /// Apply one transport event. Events from a replaced or closed session
    /// are ignored.
    pub fn handle_transport(&mut self, session: SessionId, event: TransportEvent) {
        if session != self.session || self.transport.is_none() {
            tracing::debug!(
                %session,
                current = %self.session,
                ?event,
                "ignoring event from stale session"
            );
            return;
        }
        match event {
            TransportEvent::Open => self.on_open(),
            TransportEvent::Error(err) => self.on_error(err),
            TransportEvent::Close => self.on_close(),
            TransportEvent::Message(frame) => self.dispatch(&frame),
        }
    }

    fn on_open(&mut self) {
        tracing::debug!(session = %self.session, "transport open");
        self.state = ConnectionState::Connected;
        self.log_self("Successfully connected", None);
        self.notifier.emit(Notification::Connected);
    }

    fn on_error(&mut self, err: TransportError) {
        tracing::warn!(session = %self.session, error = %err, "transport error");
        self.log_self("Connection failed", Some(json!({ "error": err.to_string() })));
        self.notifier.emit(Notification::ConnectionError);
    }

    fn on_close(&mut self) {
        tracing::debug!(session = %self.session, "transport closed");
        self.disconnect();
    }

    // -----------------------------------------------------------------------
    // Dispatch
    // -----------------------------------------------------------------------

    /// Route one wire frame: header line is the key, the rest is the body.
    pub fn dispatch(&mut self, frame: &str) {
        let (header, body) = frame.split_once('\n').unwrap_or((frame, ""));

        let key = match Key::parse(header) {
            Ok(key) => key,
            Err(err) => {
                tracing::warn!(error = %err, "dropping frame with malformed header");
                self.log_self("Malformed frame header", Some(json!({ "error": err.to_string() })));
                return;
            }
        };

        if key.is_log() {
            let entry = LogEntry::new(key, Payload::Text(body.to_string()));
            self.add_log_entry(entry);
        } else {
            tracing::debug!(schema = key.schema(), "dropping frame with unknown schema");
            self.log_self(&format!("Unknown schema {}", key.schema()), None);
        }
    }

    /// Add `entry` to its group (creating the group on first use), stamp its
    /// index and publish `NewLogEntry`. Returns the assigned index.
    pub fn add_log_entry(&mut self, entry: LogEntry) -> usize {
        let group = match self.groups.entry(entry.group_id().to_string()) {
            hash_map::Entry::Occupied(slot) => slot.into_mut(),
            hash_map::Entry::Vacant(slot) => {
                tracing::debug!(group = slot.key().as_str(), "new group");
                self.group_order.push(slot.key().clone());
                let created_at = entry.received_at();
                slot.insert(LogGroup::new(entry.group_id(), created_at))
            }
        };

        group.add(entry);
        let Some(stamped) = group.stamp_latest() else {
            return 0;
        };
        let index = stamped.index();
        let notification = Notification::NewLogEntry {
            entry: stamped.clone(),
            group: group.summary(),
        };
        self.notifier.emit(notification);
        index
    }
}

impl fmt::Debug for IngestionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionService")
            .field("state", &self.state)
            .field("session", &self.session)
            .field("groups", &self.group_order)
            .field("notifier", &self.notifier)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
