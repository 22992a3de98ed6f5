//! Bounded, newest-first event log.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Local};

pub const DEFAULT_LOG_CAPACITY: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    time: DateTime<Local>,
    message: String,
}

impl LogEntry {
    #[must_use]
    pub fn time(&self) -> DateTime<Local> {
        self.time
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Wall-clock display time, e.g. `14:03:59`.
    #[must_use]
    pub fn display_time(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.display_time(), self.message)
    }
}

/// Event log with a monotonic revision counter.
///
/// The revision is bumped on every append so the renderer can tell whether the
/// list changed without comparing entries.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    revision: usize,
}

impl Default for EventLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl EventLog {
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            revision: 0,
        }
    }

    pub fn append(&mut self, message: impl Into<String>) {
        self.append_at(Local::now(), message);
    }

    pub fn append_at(&mut self, time: DateTime<Local>, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "event");
        self.entries.push_front(LogEntry { time, message });
        self.entries.truncate(self.capacity);
        self.revision = self.revision.wrapping_add(1);
    }

    /// Newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Messages oldest first. Handy for asserting on sequences.
    #[must_use]
    pub fn messages_chronological(&self) -> Vec<&str> {
        self.entries.iter().rev().map(LogEntry::message).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    #[must_use]
    pub fn revision(&self) -> usize {
        self.revision
    }
}
