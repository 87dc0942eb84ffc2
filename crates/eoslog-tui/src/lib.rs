//! eoslog TUI: ratatui application shell.
//!
//! The TUI is a pure consumer: it sends requests to the ingest actor through
//! a [`ServiceHandle`] and renders whatever arrives on the notification
//! channel.

pub mod app;
pub mod commands;
pub mod event;
pub mod theme;
pub mod view;
pub mod widgets;

pub use app::{App, AppState};

use eoslog_core::config::{self, Config};
use eoslog_core::ingest::{actor::ServiceHandle, ConnectionParams};
use eoslog_core::Notification;
use tokio::sync::mpsc;

/// Run the TUI until the user quits. When `connect_to` is set a connection
/// is requested before the first frame.
///
/// Blocks the calling thread; call it from outside the tokio worker threads
/// (e.g. `spawn_blocking` or the main thread of a multi-threaded runtime).
pub fn run(
    config: Config,
    service: ServiceHandle,
    notifications: mpsc::UnboundedReceiver<Notification>,
    connect_to: Option<ConnectionParams>,
) -> anyhow::Result<()> {
    let theme = theme::Theme::by_name(&config.ui.theme);
    let mut state = AppState::new(config, theme);
    state.last_connection_path = Some(config::last_connection_path());

    let mut app = App::new(state, service, notifications);
    if let Some(params) = connect_to {
        app.execute(commands::Command::Connect(params));
    }
    app.run()
}
