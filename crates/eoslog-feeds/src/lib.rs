//! eoslog-feeds: log stream transports for eoslog.
//!
//! Each transport implements [`eoslog_core::ingest::Connector`]: it opens a
//! connection for a session and reports `Open`, `Message`, `Error` and `Close`
//! events back to the ingest actor over a channel.

pub mod websocket;

pub use websocket::WebSocketConnector;
