//! eoslog-core: eoslog core library.
//!
//! This crate holds the ingestion-and-grouping pipeline and the types shared
//! by the transport and the TUI.
//!
//! # Architecture
//!
//! ```text
//! frame ──► Key ──► LogEntry ──► LogGroup::add ──► Notification ──► renderer
//!             ▲                        ▲
//!             └──── IngestionService ──┘  (owned by the ingest actor)
//! ```
//!
//! The service is a plain synchronous state machine. The actor in
//! [`ingest::actor`] owns it on a single tokio task so commands from the UI and
//! events from the transport are applied one at a time.

pub mod config;
pub mod entry;
pub mod error;
pub mod group;
pub mod ingest;
pub mod key;
pub mod notify;

pub use entry::{LogEntry, Payload, DEFAULT_GROUP_ID};
pub use error::{IngestError, ParseError, TransportError};
pub use group::{GroupSummary, LogGroup};
pub use ingest::{ConnectionState, IngestionService};
pub use key::Key;
pub use notify::{Notification, NotificationKind, Notifier};
