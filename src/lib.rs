//! eoslog: real-time terminal viewer for tagged-key log streams.
//!
//! The binary wires three crates together and re-exports them so integration
//! tests and benches can reach everything from one place.
//!
//! # Architecture
//!
//! ```text
//! WebSocket ──► transport channel ──► ingest actor ──► notifications ──► TUI
//!  (feeds)                           (IngestionService)                  │
//!     ▲                                     ▲                            │
//!     └───────────── Connector ─────────────┴──────── ServiceHandle ◄────┘
//! ```
//!
//! The actor runs on the tokio runtime; the TUI (or the headless printer)
//! drives the main thread.

pub mod headless;

pub use eoslog_core as core;
pub use eoslog_feeds as feeds;
pub use eoslog_tui as tui;
