//! WebSocket transport.
//!
//! Each call to [`WebSocketConnector::open`] spawns one pump task. The task
//! connects, reports `Open`, forwards every text frame as `Message` and ends
//! with `Close`. Failures are reported as `Error` followed by `Close`.
//! Closing the returned handle cancels the task; nothing is reported after
//! a cancellation.

use futures_util::StreamExt;
use tokio::runtime::Handle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

use eoslog_core::ingest::{Connector, SessionId, TransportEvent, TransportHandle, TransportSink};
use eoslog_core::TransportError;

/// Opens WebSocket transports on a tokio runtime.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    sink: TransportSink,
    runtime: Handle,
}

impl WebSocketConnector {
    /// Use the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn new(sink: TransportSink) -> Self {
        Self::with_runtime(sink, Handle::current())
    }

    pub fn with_runtime(sink: TransportSink, runtime: Handle) -> Self {
        Self { sink, runtime }
    }
}

impl Connector for WebSocketConnector {
    fn open(&mut self, session: SessionId, uri: &Url) -> Box<dyn TransportHandle> {
        let cancel = CancellationToken::new();
        tracing::debug!(%session, host = uri.host_str().unwrap_or(""), "opening websocket");
        self.runtime.spawn(pump(
            session,
            uri.clone(),
            self.sink.clone(),
            cancel.clone(),
        ));
        Box::new(WebSocketHandle { cancel })
    }
}

/// Cancels its pump task when closed or dropped.
#[derive(Debug)]
pub struct WebSocketHandle {
    cancel: CancellationToken,
}

impl TransportHandle for WebSocketHandle {
    fn close(&mut self) {
        self.cancel.cancel();
    }
}

impl Drop for WebSocketHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn pump(session: SessionId, uri: Url, sink: TransportSink, cancel: CancellationToken) {
    let report = |event: TransportEvent| {
        // The actor may already be gone during shutdown.
        let _ = sink.send((session, event));
    };

    let connected = tokio::select! {
        _ = cancel.cancelled() => {
            tracing::debug!(%session, "connect cancelled");
            return;
        }
        result = connect_async(uri.as_str()) => result,
    };

    let mut stream = match connected {
        Ok((stream, _response)) => stream,
        Err(err) => {
            tracing::warn!(%session, error = %err, "websocket connect failed");
            report(TransportEvent::Error(TransportError::Connect {
                uri: redacted(&uri),
                reason: err.to_string(),
            }));
            report(TransportEvent::Close);
            return;
        }
    };
    report(TransportEvent::Open);

    loop {
        let frame = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(%session, "closing websocket");
                let _ = stream.close(None).await;
                return;
            }
            frame = stream.next() => frame,
        };

        match frame {
            Some(Ok(Message::Text(text))) => {
                report(TransportEvent::Message(text.as_str().to_owned()))
            }
            Some(Ok(Message::Binary(bytes))) => {
                report(TransportEvent::Message(String::from_utf8_lossy(&bytes).into_owned()))
            }
            Some(Ok(Message::Close(_))) | None => {
                tracing::debug!(%session, "websocket closed by peer");
                report(TransportEvent::Close);
                return;
            }
            // Ping/pong handled by tungstenite.
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                tracing::warn!(%session, error = %err, "websocket stream error");
                report(TransportEvent::Error(TransportError::Stream(err.to_string())));
                report(TransportEvent::Close);
                return;
            }
        }
    }
}

/// The uri without its query, so credentials stay out of error messages.
fn redacted(uri: &Url) -> String {
    let mut uri = uri.clone();
    uri.set_query(None);
    uri.to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
