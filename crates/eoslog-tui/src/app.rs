//! Top-level application state and the main event loop.
//!
//! [`App::run`] sets up the terminal, drives the crossterm event loop, and
//! tears everything down cleanly on exit or panic. Between frames it drains
//! the notification channel from the ingest actor into [`AppState`].
//!
//! [`AppState`] never talks to the actor itself. Handling a key or a command
//! returns the [`ServiceCommand`] to send, if any, so the state machine can be
//! tested without a runtime.

use crate::{
    commands::Command,
    event::{self, AppEvent},
    theme::Theme,
    view::{GroupView, GroupViews},
    widgets::{
        command_bar::{CommandBar, CommandBarState},
        group_list::{GroupList, GroupListState},
        help::HelpPopup,
        log_stream::{LogStream, LogStreamState},
        status_bar::{LinkStatus, StatusBar},
    },
};
use crossterm::{
    event::{self as ct_event, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use eoslog_core::{
    config::{Config, LastConnection},
    ingest::{
        actor::{Command as ServiceCommand, ServiceHandle},
        ConnectionParams,
    },
    Notification,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction as LayoutDir, Layout, Rect},
    Frame, Terminal,
};
use std::{io, path::PathBuf, time::Duration};
use tokio::sync::mpsc::{self, error::TryRecvError};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Groups,
    Stream,
    /// Vim-style `:` command line is active.
    Command,
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub groups: GroupViews,
    pub group_list: GroupListState,
    pub stream: LogStreamState,
    pub focus: Focus,
    /// Focus before entering command mode, restored on exit.
    pub prev_focus: Focus,
    pub theme: Theme,
    pub config: Config,
    pub show_help: bool,
    pub command_bar: CommandBarState,
    pub status: LinkStatus,
    /// Latest self-diagnostic message.
    pub last_message: Option<String>,
    /// Connection requested but not yet confirmed.
    pub pending: Option<ConnectionParams>,
    /// Where a confirmed connection is remembered. `None` disables it.
    pub last_connection_path: Option<PathBuf>,
    pub quit: bool,
}

impl AppState {
    pub fn new(config: Config, theme: Theme) -> Self {
        let stream = LogStreamState::new(
            config.ui.show_timestamps,
            config.ui.timestamp_format.clone(),
        );
        Self {
            groups: GroupViews::default(),
            group_list: GroupListState::default(),
            stream,
            focus: Focus::Groups,
            prev_focus: Focus::Groups,
            theme,
            config,
            show_help: false,
            command_bar: CommandBarState::default(),
            status: LinkStatus::Disconnected,
            last_message: None,
            pending: None,
            last_connection_path: None,
            quit: false,
        }
    }

    pub fn selected(&self) -> Option<&GroupView> {
        self.groups.at(self.group_list.cursor)
    }

    fn selected_len(&self) -> usize {
        self.selected().map_or(0, |view| view.entries.len())
    }

    /// Fold one notification from the ingest actor into the UI state.
    pub fn apply_notification(&mut self, notification: Notification) {
        match notification {
            Notification::Log(message) => self.last_message = Some(message),
            Notification::Debug(detail) => tracing::debug!(%detail, "service detail"),
            Notification::Connected => {
                let target = match self.pending.take() {
                    Some(params) => {
                        self.remember(&params);
                        params.to_string()
                    }
                    None => self.status_target(),
                };
                self.status = LinkStatus::Connected(target);
            }
            Notification::ConnectionError => {
                self.status = LinkStatus::Failed(self.status_target());
            }
            Notification::Disconnect => {
                // A connect request drops the previous session first, so a
                // Disconnect while connecting belongs to the old one.
                if let LinkStatus::Connected(_) = self.status {
                    self.status = LinkStatus::Disconnected;
                }
            }
            Notification::NewLogEntry { entry, group } => {
                let first = self.groups.is_empty();
                let position = self.groups.apply(entry, group);
                if first {
                    self.group_list.cursor = 0;
                    self.stream.reset(self.selected_len());
                } else if position == self.group_list.cursor {
                    self.stream.on_appended(self.selected_len());
                }
            }
            Notification::Cleared => {
                self.groups.clear();
                self.group_list.clamp(0);
                self.stream.reset(0);
            }
        }
    }

    fn status_target(&self) -> String {
        match &self.status {
            LinkStatus::Connecting(t) | LinkStatus::Connected(t) | LinkStatus::Failed(t) => {
                t.clone()
            }
            LinkStatus::Disconnected => String::new(),
        }
    }

    fn remember(&self, params: &ConnectionParams) {
        let Some(path) = &self.last_connection_path else {
            return;
        };
        if let Err(err) = LastConnection::from_params(params).save_to(path) {
            tracing::warn!(error = %err, path = %path.display(), "cannot save last connection");
        }
    }

    /// Handle one key event. Returns the request for the ingest actor, if any.
    pub fn handle(&mut self, event: AppEvent) -> Option<ServiceCommand> {
        // Help popup intercepts all events; only close keys pass through.
        if self.show_help {
            if matches!(
                event,
                AppEvent::Char('?') | AppEvent::Escape | AppEvent::Quit
            ) {
                tracing::debug!("help popup closed");
                self.show_help = false;
            }
            return None;
        }

        if self.focus == Focus::Command {
            return self.handle_command_bar(event);
        }

        match event {
            AppEvent::Char('?') => {
                tracing::debug!("help popup opened");
                self.show_help = true;
            }
            AppEvent::Char(':') => {
                tracing::debug!(prev_focus = ?self.focus, "entering command mode");
                self.prev_focus = self.focus;
                self.command_bar.clear();
                self.focus = Focus::Command;
            }
            AppEvent::Quit => {
                tracing::debug!("quit");
                self.quit = true;
            }
            AppEvent::FocusNext => {
                self.focus = match self.focus {
                    Focus::Groups => Focus::Stream,
                    Focus::Stream | Focus::Command => Focus::Groups,
                };
                tracing::debug!(to = ?self.focus, "focus cycle");
            }
            AppEvent::ScrollUp | AppEvent::ScrollDown | AppEvent::ScrollToTail => {
                let total = self.selected_len();
                self.stream.handle(&event, total);
            }
            AppEvent::Nav(_) if self.focus == Focus::Groups => {
                if self.group_list.handle(&event, self.groups.len()) {
                    self.stream.reset(self.selected_len());
                }
            }
            AppEvent::Nav(_) => {
                let total = self.selected_len();
                self.stream.handle(&event, total);
            }
            _ => {}
        }
        None
    }

    fn handle_command_bar(&mut self, event: AppEvent) -> Option<ServiceCommand> {
        match event {
            AppEvent::Escape => {
                tracing::debug!("command bar cancelled");
                self.command_bar.clear();
                self.focus = self.prev_focus;
                None
            }
            AppEvent::Quit => {
                self.quit = true;
                None
            }
            AppEvent::Enter => match Command::parse(&self.command_bar.input) {
                Ok(cmd) => {
                    tracing::debug!(command = ?cmd, "executing command");
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    self.execute(cmd)
                }
                Err(msg) if msg.is_empty() => {
                    self.command_bar.clear();
                    self.focus = self.prev_focus;
                    None
                }
                Err(msg) => {
                    // Bar stays open showing the error.
                    self.command_bar.error = Some(msg);
                    None
                }
            },
            other => {
                self.command_bar.handle(&other);
                None
            }
        }
    }

    /// Execute a parsed [`Command`] against the application state.
    pub fn execute(&mut self, cmd: Command) -> Option<ServiceCommand> {
        match cmd {
            Command::Quit => self.quit = true,
            Command::Help => self.show_help = !self.show_help,
            Command::Theme(name) => self.theme = Theme::by_name(&name),
            Command::Timestamps => self.stream.show_timestamps = !self.stream.show_timestamps,
            Command::Tail => {
                let total = self.selected_len();
                self.stream.handle(&AppEvent::ScrollToTail, total);
            }
            Command::Connect(params) => {
                self.status = LinkStatus::Connecting(params.to_string());
                self.pending = Some(params.clone());
                return Some(ServiceCommand::Connect(params));
            }
            Command::Disconnect => {
                self.status = LinkStatus::Disconnected;
                self.pending = None;
                return Some(ServiceCommand::Disconnect);
            }
            // Views are dropped when the service confirms with `Cleared`.
            Command::Clear => return Some(ServiceCommand::Clear),
        }
        None
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    state: AppState,
    service: ServiceHandle,
    notifications: mpsc::UnboundedReceiver<Notification>,
}

impl App {
    pub fn new(
        state: AppState,
        service: ServiceHandle,
        notifications: mpsc::UnboundedReceiver<Notification>,
    ) -> Self {
        Self {
            state,
            service,
            notifications,
        }
    }

    /// Execute a command as if typed into the command bar.
    pub fn execute(&mut self, cmd: Command) {
        if let Some(request) = self.state.execute(cmd) {
            self.send(request);
        }
    }

    fn send(&mut self, request: ServiceCommand) {
        if let Err(err) = self.service.send(request) {
            tracing::error!(error = %err, "ingest actor unavailable");
            self.state.last_message = Some(err.to_string());
        }
    }

    /// Set up the terminal, run the event loop, and restore the terminal on exit.
    pub fn run(mut self) -> anyhow::Result<()> {
        install_panic_hook();

        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal);

        // Always restore terminal, even if the loop returned an error
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        let _ = terminal.show_cursor();

        result
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        loop {
            self.drain_notifications();

            {
                let s = &self.state;
                terminal.draw(|frame| draw(frame, s))?;
            }

            if self.state.quit {
                break;
            }

            if ct_event::poll(Duration::from_millis(16))? {
                let raw = ct_event::read()?;
                if let Event::Key(key) = &raw {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                }
                let app_event = if self.state.focus == Focus::Command {
                    event::to_app_event_insert(raw)
                } else {
                    event::to_app_event(raw)
                };
                if let Some(ev) = app_event {
                    tracing::trace!(focus = ?self.state.focus, event = ?ev, "key event");
                    if let Some(request) = self.state.handle(ev) {
                        self.send(request);
                    }
                }
            }
        }
        Ok(())
    }

    fn drain_notifications(&mut self) {
        loop {
            match self.notifications.try_recv() {
                Ok(notification) => self.state.apply_notification(notification),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.state.quit {
                        tracing::error!("notification channel closed");
                        self.state.last_message = Some("ingest actor stopped".to_string());
                    }
                    break;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn draw(frame: &mut Frame, state: &AppState) {
    let area = frame.area();

    // Vertical: body | 1-line status bar
    let vert = Layout::default()
        .direction(LayoutDir::Vertical)
        .constraints([Constraint::Fill(1), Constraint::Length(1)])
        .split(area);

    let pct = state.config.ui.group_pane_width_pct.min(90);
    let horiz = Layout::default()
        .direction(LayoutDir::Horizontal)
        .constraints([Constraint::Percentage(pct), Constraint::Fill(1)])
        .split(vert[0]);

    frame.render_widget(
        GroupList::new(
            &state.group_list,
            &state.groups,
            state.focus == Focus::Groups,
            &state.theme,
        ),
        horiz[0],
    );

    let (entries, title) = match state.selected() {
        Some(view) => (view.entries.as_slice(), view.summary.id.as_str()),
        None => (&[][..], "Logs"),
    };
    frame.render_widget(
        LogStream::new(
            &state.stream,
            entries,
            title,
            state.focus == Focus::Stream,
            &state.theme,
        ),
        horiz[1],
    );

    frame.render_widget(
        StatusBar::new(&state.status, state.last_message.as_deref(), &state.theme),
        vert[1],
    );

    if state.show_help {
        frame.render_widget(HelpPopup::new(&state.theme), area);
    }

    // Command bar overlays the status row.
    if state.focus == Focus::Command {
        let cmd_area = Rect {
            y: area.bottom().saturating_sub(1),
            height: 1,
            ..area
        };
        frame.render_widget(CommandBar::new(&state.command_bar, &state.theme), cmd_area);
        let col = state.command_bar.cursor_col(cmd_area);
        frame.set_cursor_position((col, cmd_area.y));
    }
}

// ---------------------------------------------------------------------------
// Terminal helpers
// ---------------------------------------------------------------------------

fn install_panic_hook() {
    let original = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original(info);
    }));
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
