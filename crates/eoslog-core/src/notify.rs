//! Publish/subscribe notifications emitted by the ingestion service.
//!
//! The service owns a [`Notifier`] and publishes through it; renderers and
//! other collaborators subscribe with [`Notifier::on`] (one kind) or
//! [`Notifier::on_any`]. [`Notifier::forward_to`] bridges notifications onto a
//! tokio channel for consumers living on another thread.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::entry::LogEntry;
use crate::group::GroupSummary;

/// A change published by the ingestion service.
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// A self-diagnostic message.
    Log(String),
    /// Structured detail attached to a self-diagnostic message.
    Debug(Value),
    Connected,
    ConnectionError,
    Disconnect,
    /// An entry was added to a group; `group` reflects the post-add state.
    NewLogEntry { entry: LogEntry, group: GroupSummary },
    /// Every group was forgotten. Entries published earlier are stale.
    Cleared,
}

/// Discriminant of [`Notification`], used to filter subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Log,
    Debug,
    Connected,
    ConnectionError,
    Disconnect,
    NewLogEntry,
    Cleared,
}

impl Notification {
    pub fn kind(&self) -> NotificationKind {
        match self {
            Notification::Log(_) => NotificationKind::Log,
            Notification::Debug(_) => NotificationKind::Debug,
            Notification::Connected => NotificationKind::Connected,
            Notification::ConnectionError => NotificationKind::ConnectionError,
            Notification::Disconnect => NotificationKind::Disconnect,
            Notification::NewLogEntry { .. } => NotificationKind::NewLogEntry,
            Notification::Cleared => NotificationKind::Cleared,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Log => write!(f, "log"),
            NotificationKind::Debug => write!(f, "debug"),
            NotificationKind::Connected => write!(f, "connected"),
            NotificationKind::ConnectionError => write!(f, "connectionError"),
            NotificationKind::Disconnect => write!(f, "disconnect"),
            NotificationKind::NewLogEntry => write!(f, "newLogEntry"),
            NotificationKind::Cleared => write!(f, "cleared"),
        }
    }
}

impl FromStr for NotificationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "log" => Ok(NotificationKind::Log),
            "debug" => Ok(NotificationKind::Debug),
            "connected" => Ok(NotificationKind::Connected),
            "connectionError" => Ok(NotificationKind::ConnectionError),
            "disconnect" => Ok(NotificationKind::Disconnect),
            "newLogEntry" => Ok(NotificationKind::NewLogEntry),
            "cleared" => Ok(NotificationKind::Cleared),
            other => Err(format!("unknown notification: {other}")),
        }
    }
}

type Handler = Box<dyn FnMut(&Notification) + Send>;

/// Handler registry. Handlers run synchronously, in registration order, on the
/// thread that calls [`Notifier::emit`].
#[derive(Default)]
pub struct Notifier {
    handlers: Vec<(Option<NotificationKind>, Handler)>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to one kind of notification.
    pub fn on<F>(&mut self, kind: NotificationKind, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.handlers.push((Some(kind), Box::new(handler)));
        self
    }

    /// Subscribe to every notification.
    pub fn on_any<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&Notification) + Send + 'static,
    {
        self.handlers.push((None, Box::new(handler)));
        self
    }

    /// Forward every notification onto `tx`. A closed receiver is ignored.
    pub fn forward_to(&mut self, tx: mpsc::UnboundedSender<Notification>) -> &mut Self {
        self.on_any(move |notification| {
            let _ = tx.send(notification.clone());
        })
    }

    pub fn emit(&mut self, notification: Notification) {
        let kind = notification.kind();
        tracing::trace!(%kind, "notify");
        for (filter, handler) in &mut self.handlers {
            if filter.is_none_or(|k| k == kind) {
                handler(&notification);
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
