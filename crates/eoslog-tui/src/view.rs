//! Client-side mirror of the service's groups, fed by `NewLogEntry`
//! notifications.

use std::collections::HashMap;

use eoslog_core::{GroupSummary, LogEntry};

#[derive(Debug, Clone)]
pub struct GroupView {
    pub summary: GroupSummary,
    pub entries: Vec<LogEntry>,
}

/// Groups in the order their first entry arrived.
#[derive(Debug, Default)]
pub struct GroupViews {
    order: Vec<String>,
    by_id: HashMap<String, GroupView>,
}

impl GroupViews {
    /// Record one `NewLogEntry`. Returns the position of the entry's group.
    pub fn apply(&mut self, entry: LogEntry, summary: GroupSummary) -> usize {
        if let Some(view) = self.by_id.get_mut(&summary.id) {
            view.entries.push(entry);
            view.summary = summary;
            return self
                .order
                .iter()
                .position(|id| *id == view.summary.id)
                .unwrap_or_default();
        }
        self.order.push(summary.id.clone());
        self.by_id.insert(
            summary.id.clone(),
            GroupView {
                summary,
                entries: vec![entry],
            },
        );
        self.order.len() - 1
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.by_id.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn at(&self, position: usize) -> Option<&GroupView> {
        self.order.get(position).and_then(|id| self.by_id.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupView> + '_ {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }
}
