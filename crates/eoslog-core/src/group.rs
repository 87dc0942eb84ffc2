//! Log groups: per-`eos-id` accumulators.
//!
//! A group folds every entry it receives into running counters and a set of
//! tags shared by all tagged entries so far. The shared set starts unknown
//! (`None`), is seeded by the first tagged entry, and only ever narrows.
//! Once it is empty it stays empty.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::entry::LogEntry;

/// Accumulator for all entries carrying the same group id.
#[derive(Debug, Clone)]
pub struct LogGroup {
    id: String,
    items: Vec<LogEntry>,
    count: usize,
    errors_count: usize,
    sql_count: usize,
    performance_total: f64,
    shared_tags: Option<Vec<String>>,
    first_received_at: DateTime<Utc>,
    last_received_at: DateTime<Utc>,
}

/// Everything a renderer needs to know about a group, without its items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub id: String,
    pub count: usize,
    pub errors_count: usize,
    pub sql_count: usize,
    pub performance_total: f64,
    pub shared_tags: Vec<String>,
    pub first_received_at: DateTime<Utc>,
    pub last_received_at: DateTime<Utc>,
}

impl LogGroup {
    pub fn new(id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            items: Vec::new(),
            count: 0,
            errors_count: 0,
            sql_count: 0,
            performance_total: 0.0,
            shared_tags: None,
            first_received_at: created_at,
            last_received_at: created_at,
        }
    }

    /// Fold `entry` into the group's aggregates and append it.
    ///
    /// Performance data is detected through the entry's `time` field while
    /// the accumulated amount is its `perf` field. The index is not touched
    /// here; call [`LogGroup::stamp_latest`] afterwards.
    pub fn add(&mut self, entry: LogEntry) {
        self.count += 1;
        self.last_received_at = entry.received_at();
        if entry.has_exception() {
            self.errors_count += 1;
        }
        if entry.has_sql() {
            self.sql_count += 1;
        }
        if entry.has_performance_data() {
            self.performance_total += entry.perf().unwrap_or(0.0);
        }
        self.narrow_shared_tags(entry.key().tags());
        self.items.push(entry);
    }

    /// Set the most recently added entry's index to the group's count and
    /// return it.
    pub fn stamp_latest(&mut self) -> Option<&LogEntry> {
        let index = self.count;
        let latest = self.items.last_mut()?;
        latest.set_index(index);
        Some(latest)
    }

    fn narrow_shared_tags(&mut self, tags: &[String]) {
        // Untagged entries say nothing about shared tags.
        if tags.is_empty() {
            return;
        }
        match &mut self.shared_tags {
            Some(shared) => shared.retain(|tag| tags.contains(tag)),
            None => {
                let mut seed: Vec<String> = Vec::with_capacity(tags.len());
                for tag in tags {
                    if !seed.contains(tag) {
                        seed.push(tag.clone());
                    }
                }
                self.shared_tags = Some(seed);
            }
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn items(&self) -> &[LogEntry] {
        &self.items
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn errors_count(&self) -> usize {
        self.errors_count
    }

    pub fn sql_count(&self) -> usize {
        self.sql_count
    }

    pub fn performance_total(&self) -> f64 {
        self.performance_total
    }

    /// Tags shared by every tagged entry, or an empty slice if no tagged
    /// entry has arrived yet.
    pub fn shared_tags(&self) -> &[String] {
        self.shared_tags.as_deref().unwrap_or(&[])
    }

    /// `false` until the first tagged entry arrives.
    pub fn has_tag_data(&self) -> bool {
        self.shared_tags.is_some()
    }

    pub fn first_received_at(&self) -> DateTime<Utc> {
        self.first_received_at
    }

    pub fn last_received_at(&self) -> DateTime<Utc> {
        self.last_received_at
    }

    pub fn summary(&self) -> GroupSummary {
        GroupSummary {
            id: self.id.clone(),
            count: self.count,
            errors_count: self.errors_count,
            sql_count: self.sql_count,
            performance_total: self.performance_total,
            shared_tags: self.shared_tags().to_vec(),
            first_received_at: self.first_received_at,
            last_received_at: self.last_received_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
