//! Usage ledger
//!
//! 每个链接一条记录：创建时间 + 按时间排序的访问时间序列。
//! Writers are the per-topic consumption loops; readers are diagnostics and
//! the final report, so a read-write lock over the whole map is enough.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LedgerEntry {
    pub link_key: String,
    pub created_at: DateTime<Utc>,
    /// Visit times, oldest first
    pub visits: Vec<DateTime<Utc>>,
}

impl LedgerEntry {
    fn new(link_key: &str, created_at: DateTime<Utc>) -> Self {
        Self {
            link_key: link_key.to_string(),
            created_at,
            visits: Vec::new(),
        }
    }

    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn last_visit(&self) -> Option<DateTime<Utc>> {
        self.visits.last().copied()
    }

    /// One-line human readable form used in logs and the shutdown report
    pub fn summary(&self) -> String {
        let base = format!(
            "ID: {} | Created: {} | Visits: {}",
            self.link_key,
            self.created_at.format(DISPLAY_FORMAT),
            self.visit_count()
        );
        match self.last_visit() {
            Some(last) => format!("{}, last visit: {}", base, last.format(DISPLAY_FORMAT)),
            None => base,
        }
    }

    fn push_visit(&mut self, at: DateTime<Utc>) {
        // 保持有序：跨分区/重投递时事件可能乱序到达
        let idx = self.visits.partition_point(|t| *t <= at);
        self.visits.insert(idx, at);
    }
}

#[derive(Default)]
pub struct UsageLedger {
    entries: RwLock<HashMap<String, LedgerEntry>>,
}

impl UsageLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `key` was created at `at`
    ///
    /// A duplicate creation event overwrites `created_at` and keeps any
    /// visits already recorded.
    pub fn record_creation(&self, key: &str, at: DateTime<Utc>) -> LedgerEntry {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_string())
            .and_modify(|e| e.created_at = at)
            .or_insert_with(|| LedgerEntry::new(key, at));
        entry.clone()
    }

    /// Record a visit of `key` at `at`
    ///
    /// Visits can outrun their creation event since the two topics are
    /// consumed independently. An unknown key gets an entry whose
    /// `created_at` is the visit time.
    pub fn record_visit(&self, key: &str, at: DateTime<Utc>) -> LedgerEntry {
        let mut entries = self.entries.write();
        let entry = entries
            .entry(key.to_string())
            .or_insert_with(|| LedgerEntry::new(key, at));
        entry.push_visit(at);
        entry.clone()
    }

    pub fn entry(&self, key: &str) -> Option<LedgerEntry> {
        self.entries.read().get(key).cloned()
    }

    /// Snapshot of every entry, ordered by creation time then key
    pub fn report(&self) -> Vec<LedgerEntry> {
        let mut report: Vec<LedgerEntry> = self.entries.read().values().cloned().collect();
        report.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.link_key.cmp(&b.link_key))
        });
        report
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
