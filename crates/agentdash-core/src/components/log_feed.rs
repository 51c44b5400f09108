// ── Activity log ──
//
// Newest-first list of log entries with two composable visibility filters.
// Filtering never removes entries; it only changes what `visible()` yields.

use std::collections::VecDeque;

use crate::model::{LogEntry, LogKind, local_time_label};

/// Row button text for an entry of the given kind.
pub fn action_label(kind: LogKind) -> &'static str {
    match kind {
        LogKind::Error => "Retry",
        LogKind::Warning => "Investigate",
        LogKind::Info => "Review",
        LogKind::Other => "View",
    }
}

/// Category half of the log filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(LogKind),
}

impl CategoryFilter {
    pub fn matches(self, kind: LogKind) -> bool {
        match self {
            Self::All => true,
            Self::Only(k) => k == kind,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::All => "all".into(),
            Self::Only(kind) => kind.to_string(),
        }
    }
}

/// Both filters, applied together.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub category: CategoryFilter,
    /// Lowercased search text. Empty means no text filter.
    query: String,
}

impl LogFilter {
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_active(&self) -> bool {
        self.category != CategoryFilter::All || !self.query.is_empty()
    }

    pub fn matches(&self, entry: &LogEntry) -> bool {
        if !self.category.matches(entry.kind) {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }
        entry.message.to_lowercase().contains(&self.query)
            || entry.agent.to_lowercase().contains(&self.query)
    }
}

/// In-memory activity log, most recent entry first.
#[derive(Debug, Clone)]
pub struct LogFeed {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    filter: LogFilter,
    unseen_errors: usize,
}

impl LogFeed {
    /// `capacity` is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
            filter: LogFilter::default(),
            unseen_errors: 0,
        }
    }

    /// Prepend each entry in turn: the last entry of the batch ends up on top.
    pub fn append_entries<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = LogEntry>,
    {
        for entry in entries {
            self.push(entry);
        }
    }

    /// Record a dashboard-originated entry. `None` stamps local wall-clock time.
    pub fn add_local_entry(
        &mut self,
        kind: LogKind,
        agent: impl Into<String>,
        message: impl Into<String>,
        timestamp: Option<String>,
    ) {
        self.push(LogEntry {
            timestamp: timestamp.unwrap_or_else(local_time_label),
            agent: agent.into(),
            kind,
            message: message.into(),
        });
    }

    fn push(&mut self, entry: LogEntry) {
        if entry.kind == LogKind::Error {
            self.unseen_errors += 1;
        }
        self.entries.push_front(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    pub fn filter_by_category(&mut self, category: CategoryFilter) {
        self.filter.category = category;
    }

    /// Case-insensitive substring search over message and agent. The query
    /// is matched as typed, surrounding spaces included; an empty or
    /// all-whitespace query clears the text filter.
    pub fn filter_by_text(&mut self, query: &str) {
        self.filter.query = if query.trim().is_empty() {
            String::new()
        } else {
            query.to_lowercase()
        };
    }

    pub fn filter(&self) -> &LogFilter {
        &self.filter
    }

    /// Entries passing the current filter, newest first.
    pub fn visible(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter().filter(|e| self.filter.matches(e))
    }

    pub fn visible_count(&self) -> usize {
        self.visible().count()
    }

    /// Every stored entry, newest first, ignoring filters.
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Error entries recorded since the last [`acknowledge`](Self::acknowledge).
    pub fn unseen_errors(&self) -> usize {
        self.unseen_errors
    }

    pub fn acknowledge(&mut self) {
        self.unseen_errors = 0;
    }
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_LOG_CAPACITY)
    }
}
