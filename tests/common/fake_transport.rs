//! In-memory stand-ins for the WebSocket transport.
//!
//! [`FakeConnector`] never touches the network. It records every `open` and
//! `close` in a shared [`FakeLink`] so tests can inspect what the service did,
//! and optionally reports `Open` straight away through a transport sink.

use std::sync::{Arc, Mutex};

use eoslog_core::ingest::{Connector, SessionId, TransportEvent, TransportHandle, TransportSink};
use eoslog_core::{IngestionService, Notification};
use url::Url;

// ---------------------------------------------------------------------------
// Connector
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LinkLog {
    /// Every transport opened, in order.
    pub opened: Vec<(SessionId, Url)>,
    /// Sessions whose handle was closed, in order.
    pub closed: Vec<SessionId>,
}

/// Shared view of what a [`FakeConnector`] has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct FakeLink(Arc<Mutex<LinkLog>>);

impl FakeLink {
    pub fn opened(&self) -> Vec<(SessionId, Url)> {
        self.0.lock().unwrap().opened.clone()
    }

    pub fn closed(&self) -> Vec<SessionId> {
        self.0.lock().unwrap().closed.clone()
    }

    pub fn last_session(&self) -> Option<SessionId> {
        self.0.lock().unwrap().opened.last().map(|(s, _)| *s)
    }
}

pub struct FakeConnector {
    link: FakeLink,
    /// When set, `Open` is reported as soon as a transport is opened.
    auto_open: Option<TransportSink>,
}

impl FakeConnector {
    /// A connector that records but never reports anything.
    pub fn silent() -> (Self, FakeLink) {
        let link = FakeLink::default();
        let connector = Self {
            link: link.clone(),
            auto_open: None,
        };
        (connector, link)
    }

    /// A connector whose transports open immediately.
    pub fn auto_open(sink: TransportSink) -> (Self, FakeLink) {
        let link = FakeLink::default();
        let connector = Self {
            link: link.clone(),
            auto_open: Some(sink),
        };
        (connector, link)
    }
}

impl Connector for FakeConnector {
    fn open(&mut self, session: SessionId, uri: &Url) -> Box<dyn TransportHandle> {
        self.link
            .0
            .lock()
            .unwrap()
            .opened
            .push((session, uri.clone()));
        if let Some(sink) = &self.auto_open {
            let _ = sink.send((session, TransportEvent::Open));
        }
        Box::new(FakeHandle {
            session,
            link: self.link.clone(),
            closed: false,
        })
    }
}

struct FakeHandle {
    session: SessionId,
    link: FakeLink,
    closed: bool,
}

impl TransportHandle for FakeHandle {
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.link.0.lock().unwrap().closed.push(self.session);
        }
    }
}

// ---------------------------------------------------------------------------
// Notification recording
// ---------------------------------------------------------------------------

/// Every notification a service has emitted since [`record`] was called.
#[derive(Debug, Clone, Default)]
pub struct Recorded(Arc<Mutex<Vec<Notification>>>);

impl Recorded {
    pub fn all(&self) -> Vec<Notification> {
        self.0.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }

    /// Messages of every `Log` notification.
    pub fn log_messages(&self) -> Vec<String> {
        self.all()
            .into_iter()
            .filter_map(|n| match n {
                Notification::Log(message) => Some(message),
                _ => None,
            })
            .collect()
    }
}

/// Subscribe a recorder to every notification of `service`.
pub fn record(service: &mut IngestionService) -> Recorded {
    let recorded = Recorded::default();
    let sink = recorded.clone();
    service
        .notifier_mut()
        .on_any(move |n| sink.0.lock().unwrap().push(n.clone()));
    recorded
}

/// A fresh service over a silent fake connector, with a recorder attached.
pub fn silent_service() -> (IngestionService, FakeLink, Recorded) {
    let (connector, link) = FakeConnector::silent();
    let mut service = IngestionService::new(connector);
    let recorded = record(&mut service);
    (service, link, recorded)
}
