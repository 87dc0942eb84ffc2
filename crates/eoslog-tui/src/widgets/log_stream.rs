//! Log stream widget: the scrollable live-tail pane on the right.
//!
//! Shows the entries of the group selected in the group list.
//!
//! # Navigation (when pane is focused)
//!
//! | Key | Action |
//! |-----|--------|
//! | `↑` / `k` | Move cursor up one line (scrolls view if needed) |
//! | `↓` / `j` | Move cursor down one line |
//! | `PageUp` / `Ctrl+u` | Scroll up one page |
//! | `PageDown` / `Ctrl+d` | Scroll down one page |
//! | `G` | Jump to tail and resume live-tail |
//!
//! # Scroll semantics
//!
//! `scroll_offset` = number of entries hidden at the bottom (0 = live tail).
//! `cursor` = absolute index into the group's entries (0 = oldest). The
//! entries themselves live in the app's group views; every method takes the
//! current entry count instead.

use std::cell::Cell;

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use eoslog_core::LogEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};

const PAGE_STEP: usize = 10;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct LogStreamState {
    /// Number of entries hidden at the bottom (0 = live tail).
    pub scroll_offset: usize,
    /// Absolute index of the highlighted line.
    pub cursor: usize,
    /// When true, new entries do not advance the view.
    pub paused: bool,
    /// Count of entries that arrived while paused.
    pub buffered_new: usize,
    pub show_timestamps: bool,
    pub timestamp_format: String,
    /// Cached from the last render so `handle()` can do cursor-aware scrolling.
    last_height: Cell<usize>,
}

impl Default for LogStreamState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            cursor: 0,
            paused: false,
            buffered_new: 0,
            show_timestamps: true,
            timestamp_format: "%H:%M:%S%.3f".to_string(),
            last_height: Cell::new(40),
        }
    }
}

impl LogStreamState {
    pub fn new(show_timestamps: bool, timestamp_format: String) -> Self {
        Self {
            show_timestamps,
            timestamp_format,
            ..Self::default()
        }
    }

    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Exclusive range of entries currently visible.
    fn visible_range(&self, total: usize) -> (usize, usize) {
        let end = total.saturating_sub(self.scroll_offset);
        let start = end.saturating_sub(self.height());
        (start, end)
    }

    /// Back to the live tail of a (possibly different) group.
    pub fn reset(&mut self, total: usize) {
        self.scroll_offset = 0;
        self.cursor = total.saturating_sub(1);
        self.paused = false;
        self.buffered_new = 0;
    }

    /// An entry was appended to the shown group; `total` includes it.
    ///
    /// While paused the view is pinned by growing the hidden tail.
    pub fn on_appended(&mut self, total: usize) {
        if self.paused {
            self.buffered_new += 1;
            self.scroll_offset += 1;
        } else {
            self.cursor = total.saturating_sub(1);
        }
    }

    /// Handle a navigation event from the app shell.
    ///
    /// Scrolling up pauses; `G` or scrolling back to the tail resumes.
    pub fn handle(&mut self, event: &AppEvent, total: usize) {
        if total == 0 {
            return;
        }

        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
                self.paused = true;
                let (start, _) = self.visible_range(total);
                if self.cursor < start {
                    self.scroll_offset = total.saturating_sub(self.cursor + self.height());
                }
                tracing::debug!(
                    cursor = self.cursor,
                    scroll_offset = self.scroll_offset,
                    "stream: cursor up"
                );
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < total {
                    self.cursor += 1;
                }
                let (_, end) = self.visible_range(total);
                if self.cursor >= end {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
                if self.scroll_offset == 0 && self.cursor + 1 == total {
                    self.paused = false;
                    self.buffered_new = 0;
                }
                tracing::debug!(
                    cursor = self.cursor,
                    scroll_offset = self.scroll_offset,
                    paused = self.paused,
                    "stream: cursor down"
                );
            }
            AppEvent::ScrollUp => {
                self.paused = true;
                self.scroll_offset = (self.scroll_offset + PAGE_STEP).min(total);
                let (_, end) = self.visible_range(total);
                self.cursor = end.saturating_sub(1);
                tracing::debug!(scroll_offset = self.scroll_offset, "stream: page up");
            }
            AppEvent::ScrollDown => {
                self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_STEP);
                let (_, end) = self.visible_range(total);
                self.cursor = end.saturating_sub(1);
                if self.scroll_offset == 0 {
                    self.reset(total);
                }
                tracing::debug!(scroll_offset = self.scroll_offset, "stream: page down");
            }
            AppEvent::ScrollToTail => {
                self.reset(total);
                tracing::debug!(cursor = self.cursor, "stream: jumped to tail");
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct LogStream<'a> {
    state: &'a LogStreamState,
    entries: &'a [LogEntry],
    title: &'a str,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> LogStream<'a> {
    pub fn new(
        state: &'a LogStreamState,
        entries: &'a [LogEntry],
        title: &'a str,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            entries,
            title,
            focused,
            theme,
        }
    }
}

impl Widget for LogStream<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        // Draw always runs before handle().
        self.state.last_height.set(height);

        let total = self.entries.len();
        let (start, end) = self.state.visible_range(total);

        let cursor_row = (self.focused && self.state.cursor >= start && self.state.cursor < end)
            .then(|| self.state.cursor - start);

        let mut lines: Vec<Line<'static>> = self.entries[start..end]
            .iter()
            .enumerate()
            .map(|(row, entry)| {
                let line = render_entry(entry, self.state, self.theme);
                if Some(row) == cursor_row {
                    line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    line
                }
            })
            .collect();

        if self.state.paused {
            let msg = if self.state.buffered_new > 0 {
                format!(
                    " ⏸  paused, {} new lines (G to resume) ",
                    self.state.buffered_new
                )
            } else {
                " ⏸  paused  (G to resume) ".to_string()
            };
            let banner = Line::from(Span::styled(
                msg,
                Style::default()
                    .bg(Color::DarkGray)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ));
            if lines.is_empty() {
                lines.push(banner);
            } else {
                lines[0] = banner;
            }
        }

        // Scrollbar strip sits inside the borders so its track matches the rows.
        let text_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines).render(text_area, buf);

        if total > 0 {
            let mut sb_state = ScrollbarState::new(total)
                .position(start)
                .viewport_content_length(height);
            StatefulWidget::render(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(None)
                    .end_symbol(None),
                sb_area,
                buf,
                &mut sb_state,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Entry rendering
// ---------------------------------------------------------------------------

/// `[time] #index identifier [tags] │ message`, first message line only.
fn render_entry(entry: &LogEntry, state: &LogStreamState, theme: &Theme) -> Line<'static> {
    let dim = Style::default().add_modifier(Modifier::DIM);
    let mut spans: Vec<Span<'static>> = Vec::new();

    if state.show_timestamps {
        spans.push(Span::styled(
            format!(
                "{} ",
                entry
                    .received_at()
                    .with_timezone(&chrono::Local)
                    .format(&state.timestamp_format)
            ),
            dim,
        ));
    }

    spans.push(Span::styled(format!("#{:<5} ", entry.index()), dim));

    let identifier = entry.key().identifier();
    spans.push(Span::styled(
        format!("{identifier:<12} "),
        theme.identifier_style(identifier),
    ));

    if !entry.key().tags().is_empty() {
        spans.push(Span::styled(
            format!("[{}] ", entry.key().tags().join(",")),
            theme.tags,
        ));
    }

    spans.push(Span::styled("│ ".to_string(), dim));

    let message = entry.message().lines().next().unwrap_or_default().to_string();
    spans.push(Span::styled(message, theme.entry_style(entry)));

    Line::from(spans)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
