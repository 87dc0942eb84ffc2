#![allow(unused)]
//! Full pipeline harness: local WebSocket server → transport → actor.
//!
//! # What this covers
//!
//! - **Happy path**: the real `WebSocketConnector` connects to a local
//!   server, frames flow through the actor and end up grouped.
//! - **Credentials on the wire**: the server sees tag / realm / secret as
//!   query parameters of the request URI.
//! - **Peer close**: the server hanging up moves the service back to
//!   `Disconnected` while keeping its groups.
//! - **Refused connection**: reported as `ConnectionError` with the service
//!   ending up `Disconnected`.
//!
//! # What this does NOT cover
//!
//! - TLS (`wss://`) endpoints
//! - TUI rendering
//!
//! # Running
//!
//! ```sh
//! cargo test --test pipeline_harness
//! ```

mod common;
use common::*;

use std::time::Duration;

use eoslog_core::ingest::actor::{self, ServiceHandle, ServiceSnapshot};
use eoslog_core::ingest::{transport_channel, ConnectionParams, Credentials};
use eoslog_core::{ConnectionState, IngestionService, Notification};
use eoslog_feeds::WebSocketConnector;
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::Message;

/// Serve one client: send `frames`, then either hang up or wait for the
/// client to leave. Returns the port and the request URI the server saw.
async fn serve(frames: Vec<String>, hang_up: bool) -> (u16, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (seen_tx, seen_rx) = oneshot::channel();
    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let callback = move |request: &Request, response: Response| {
            let _ = seen_tx.send(request.uri().to_string());
            Ok::<_, ErrorResponse>(response)
        };
        let mut ws = tokio_tungstenite::accept_hdr_async(tcp, callback)
            .await
            .unwrap();
        for frame in frames {
            ws.send(Message::text(frame)).await.unwrap();
        }
        if hang_up {
            let _ = ws.close(None).await;
        } else {
            while ws.next().await.is_some() {}
        }
    });
    (port, seen_rx)
}

fn start() -> (ServiceHandle, mpsc::UnboundedReceiver<Notification>) {
    let (sink, events) = transport_channel();
    let mut service = IngestionService::new(WebSocketConnector::new(sink));
    let (tx, rx) = mpsc::unbounded_channel();
    service.notifier_mut().forward_to(tx);
    let (handle, _task) = actor::spawn(service, events);
    (handle, rx)
}

async fn eventually(
    handle: &ServiceHandle,
    mut done: impl FnMut(&ServiceSnapshot) -> bool,
) -> ServiceSnapshot {
    for _ in 0..500 {
        let snapshot = handle.snapshot().await.expect("actor alive");
        if done(&snapshot) {
            return snapshot;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

fn g1_count(snapshot: &ServiceSnapshot) -> usize {
    snapshot
        .groups
        .iter()
        .find(|g| g.id == "g1")
        .map_or(0, |g| g.count)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn frames_from_a_live_server_are_grouped() {
    let frames = END_TO_END_FRAMES.iter().map(|f| f.to_string()).collect();
    let (port, seen_uri) = serve(frames, false).await;
    let (handle, _notifications) = start();

    let params = ConnectionParams::new("127.0.0.1", port).with_credentials(Credentials {
        tag: "t".into(),
        realm: "r".into(),
        secret: "s".into(),
    });
    handle.connect(params).unwrap();

    let snapshot = eventually(&handle, |s| g1_count(s) == 2).await;
    assert_eq!(snapshot.state, ConnectionState::Connected);
    let g1 = snapshot.groups.iter().find(|g| g.id == "g1").unwrap();
    assert_eq!(g1.sql_count, 1);
    assert_eq!(g1.shared_tags, vec!["web".to_string()]);

    let uri = tokio::time::timeout(Duration::from_secs(5), seen_uri)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(uri, "/?tag=t&realm=r&secret=s");

    handle.disconnect().unwrap();
    let snapshot = eventually(&handle, |s| s.state == ConnectionState::Disconnected).await;
    assert_eq!(g1_count(&snapshot), 2);
}

#[tokio::test]
async fn peer_hang_up_disconnects_but_keeps_groups() {
    let frames = vec![END_TO_END_FRAMES[0].to_string()];
    let (port, _seen) = serve(frames, true).await;
    let (handle, mut notifications) = start();

    handle.connect(ConnectionParams::new("127.0.0.1", port)).unwrap();
    eventually(&handle, |s| {
        g1_count(s) == 1 && s.state == ConnectionState::Disconnected
    })
    .await;

    let mut kinds = Vec::new();
    while let Ok(n) = notifications.try_recv() {
        kinds.push(n.kind());
    }
    let connected = kinds
        .iter()
        .position(|k| *k == eoslog_core::NotificationKind::Connected)
        .expect("connected before hang-up");
    assert!(kinds[connected..].contains(&eoslog_core::NotificationKind::Disconnect));
}

#[tokio::test]
async fn refused_connection_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let (handle, mut notifications) = start();

    handle.connect(ConnectionParams::new("127.0.0.1", port)).unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let next = tokio::time::timeout_at(deadline, notifications.recv())
            .await
            .expect("no ConnectionError before the deadline")
            .expect("notification channel closed");
        if next == Notification::ConnectionError {
            break;
        }
    }
    eventually(&handle, |s| s.state == ConnectionState::Disconnected).await;
}
