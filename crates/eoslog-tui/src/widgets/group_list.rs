//! Group list widget: one row per log group in the left pane.
//!
//! Each row shows the group id, its entry count and the non-zero counters:
//!
//! ```text
//! checkout-7f3a   12  E2 S5 P140.5  [web]
//! ```
//!
//! `E` is the exception count, `S` the SQL count, `P` the performance total
//! and the bracketed list the tags shared by every tagged entry.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use crate::view::GroupViews;
use eoslog_core::GroupSummary;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct GroupListState {
    /// Position of the selected group.
    pub cursor: usize,
}

impl GroupListState {
    /// Move the cursor. Returns `true` when the selection changed.
    pub fn handle(&mut self, event: &AppEvent, len: usize) -> bool {
        let before = self.cursor;
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.cursor = self.cursor.saturating_sub(1);
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
            }
            _ => {}
        }
        if self.cursor != before {
            tracing::debug!(cursor = self.cursor, "groups: cursor moved");
        }
        self.cursor != before
    }

    pub fn clamp(&mut self, len: usize) {
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct GroupList<'a> {
    state: &'a GroupListState,
    groups: &'a GroupViews,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> GroupList<'a> {
    pub fn new(
        state: &'a GroupListState,
        groups: &'a GroupViews,
        focused: bool,
        theme: &'a Theme,
    ) -> Self {
        Self {
            state,
            groups,
            focused,
            theme,
        }
    }
}

impl Widget for GroupList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered()
            .title(format!(" Groups ({}) ", self.groups.len()))
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let items: Vec<ListItem> = self
            .groups
            .iter()
            .map(|view| ListItem::new(group_line(&view.summary, self.theme)))
            .collect();

        let list =
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let selected = (!self.groups.is_empty()).then_some(self.state.cursor);
        let mut list_state = ListState::default().with_selected(selected);
        StatefulWidget::render(list, inner, buf, &mut list_state);
    }
}

fn group_line(summary: &GroupSummary, theme: &Theme) -> Line<'static> {
    let mut spans = vec![
        Span::styled(
            format!("{:<14} ", summary.id),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{:>5} ", summary.count)),
    ];
    let counters = counters(summary);
    if !counters.is_empty() {
        spans.push(Span::styled(format!("{counters} "), theme.entry_exception));
    }
    if !summary.shared_tags.is_empty() {
        spans.push(Span::styled(
            format!("[{}]", summary.shared_tags.join(",")),
            theme.tags,
        ));
    }
    Line::from(spans)
}

/// `E<n> S<n> P<total>`, omitting zero counters.
fn counters(summary: &GroupSummary) -> String {
    let mut parts = Vec::new();
    if summary.errors_count > 0 {
        parts.push(format!("E{}", summary.errors_count));
    }
    if summary.sql_count > 0 {
        parts.push(format!("S{}", summary.sql_count));
    }
    if summary.performance_total != 0.0 {
        parts.push(format!("P{}", summary.performance_total));
    }
    parts.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn summary(errors: usize, sql: usize, perf: f64) -> GroupSummary {
        GroupSummary {
            id: "g1".into(),
            count: 3,
            errors_count: errors,
            sql_count: sql,
            performance_total: perf,
            shared_tags: vec![],
            first_received_at: Utc::now(),
            last_received_at: Utc::now(),
        }
    }

    #[test]
    fn counters_skip_zeroes() {
        assert_eq!(counters(&summary(0, 0, 0.0)), "");
        assert_eq!(counters(&summary(2, 0, 1.5)), "E2 P1.5");
        assert_eq!(counters(&summary(1, 4, 0.0)), "E1 S4");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut state = GroupListState::default();
        assert!(!state.handle(&AppEvent::Nav(Direction::Up), 3));
        assert!(state.handle(&AppEvent::Nav(Direction::Down), 3));
        assert!(state.handle(&AppEvent::Nav(Direction::Down), 3));
        assert!(!state.handle(&AppEvent::Nav(Direction::Down), 3));
        assert_eq!(state.cursor, 2);

        state.clamp(1);
        assert_eq!(state.cursor, 0);
    }
}
