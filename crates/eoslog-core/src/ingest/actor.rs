//! Single-task owner of an [`IngestionService`].
//!
//! The service is not shared. One tokio task owns it and applies, one at a
//! time, both [`Command`]s from a [`ServiceHandle`] and events arriving from
//! the transport. Subscribers registered on the service before [`spawn`] run
//! on that task.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use serde_json::Value;

use super::transport::{ConnectionParams, TransportEvents};
use super::{ConnectionState, IngestionService};
use crate::error::IngestError;
use crate::group::GroupSummary;

/// Requests accepted by the actor.
#[derive(Debug)]
pub enum Command {
    Connect(ConnectionParams),
    Disconnect,
    LogSelf {
        message: String,
        object: Option<Value>,
    },
    Clear,
    Snapshot(oneshot::Sender<ServiceSnapshot>),
}

/// Point-in-time view of the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSnapshot {
    pub state: ConnectionState,
    pub groups: Vec<GroupSummary>,
}

/// Cloneable sender side of the actor.
#[derive(Debug, Clone)]
pub struct ServiceHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl ServiceHandle {
    pub fn send(&self, command: Command) -> Result<(), IngestError> {
        self.tx.send(command).map_err(|_| IngestError::ActorStopped)
    }

    pub fn connect(&self, params: ConnectionParams) -> Result<(), IngestError> {
        self.send(Command::Connect(params))
    }

    pub fn disconnect(&self) -> Result<(), IngestError> {
        self.send(Command::Disconnect)
    }

    pub fn log_self(
        &self,
        message: impl Into<String>,
        object: Option<Value>,
    ) -> Result<(), IngestError> {
        self.send(Command::LogSelf {
            message: message.into(),
            object,
        })
    }

    pub fn clear(&self) -> Result<(), IngestError> {
        self.send(Command::Clear)
    }

    pub async fn snapshot(&self) -> Result<ServiceSnapshot, IngestError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot(reply))?;
        rx.await.map_err(|_| IngestError::ActorStopped)
    }
}

/// Spawn the actor on the current tokio runtime.
///
/// The task runs until every [`ServiceHandle`] is dropped, then disconnects
/// and returns the service.
pub fn spawn(
    service: IngestionService,
    transport_events: TransportEvents,
) -> (ServiceHandle, JoinHandle<IngestionService>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let task = tokio::spawn(run(service, rx, transport_events));
    (ServiceHandle { tx }, task)
}

async fn run(
    mut service: IngestionService,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut transport_events: TransportEvents,
) -> IngestionService {
    // A closed transport channel only disables its branch.
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => apply(&mut service, command),
                None => break,
            },
            Some((session, event)) = transport_events.recv() => {
                service.handle_transport(session, event);
            }
        }
    }

    tracing::debug!("ingest actor stopping");
    if service.state() != ConnectionState::Disconnected {
        service.disconnect();
    }
    service
}

fn apply(service: &mut IngestionService, command: Command) {
    match command {
        Command::Connect(params) => {
            // Failure has already been reported through the notifier.
            if let Err(err) = service.connect(&params) {
                tracing::debug!(error = %err, "connect rejected");
            }
        }
        Command::Disconnect => service.disconnect(),
        Command::LogSelf { message, object } => service.log_self(&message, object),
        Command::Clear => service.clear_groups(),
        Command::Snapshot(reply) => {
            let snapshot = ServiceSnapshot {
                state: service.state(),
                groups: service.group_summaries(),
            };
            // The requester may have given up.
            let _ = reply.send(snapshot);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
