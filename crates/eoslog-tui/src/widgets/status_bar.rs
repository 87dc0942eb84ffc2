//! Status bar: connection state on the left, latest self-diagnostic on the
//! right, one row at the bottom of the screen.

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

/// Connection state as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LinkStatus {
    #[default]
    Disconnected,
    Connecting(String),
    Connected(String),
    /// The last attempt reported a connection error.
    Failed(String),
}

impl LinkStatus {
    fn label(&self) -> String {
        match self {
            LinkStatus::Disconnected => " disconnected ".to_string(),
            LinkStatus::Connecting(target) => format!(" connecting {target} "),
            LinkStatus::Connected(target) => format!(" connected {target} "),
            LinkStatus::Failed(target) => format!(" failed {target} "),
        }
    }

    fn style(&self, theme: &Theme) -> Style {
        match self {
            LinkStatus::Disconnected => theme.status_disconnected,
            LinkStatus::Connecting(_) => theme.status_connecting,
            LinkStatus::Connected(_) => theme.status_connected,
            LinkStatus::Failed(_) => theme.status_error,
        }
    }
}

pub struct StatusBar<'a> {
    status: &'a LinkStatus,
    message: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(status: &'a LinkStatus, message: Option<&'a str>, theme: &'a Theme) -> Self {
        Self {
            status,
            message,
            theme,
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dim = Style::default().add_modifier(Modifier::DIM);
        let mut spans = vec![Span::styled(self.status.label(), self.status.style(self.theme))];
        if let Some(message) = self.message {
            spans.push(Span::styled(format!(" {message}"), dim));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        let hint = " :cmd  ?:help  q:quit ";
        let hint_x = area.right().saturating_sub(hint.len() as u16);
        buf.set_string(hint_x, area.y, hint, dim);
    }
}
