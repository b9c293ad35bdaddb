//! Task records and the identifiers that scope them.

use crate::interval::IntervalKey;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifier of a document that owns task records (e.g. `Main.WebHome`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of a user that can author or be responsible for tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The persisted representation of one task directive.
///
/// `id` is unique within the owning document and immutable once assigned.
/// `creator` is set at creation and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: String,
    pub due_date: Option<NaiveDateTime>,
    pub reminder_intervals: BTreeSet<IntervalKey>,
    pub responsible: Vec<UserId>,
    pub content: String,
    pub creator: UserId,
    pub done: bool,
}

/// Notification event kinds produced for responsible users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskEvent {
    /// A task was newly assigned to the user.
    Assigned,
    /// A task's due date entered one of its reminder windows.
    Expiring,
}

impl TaskEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Expiring => "expiring",
        }
    }
}

/// Split a comma-separated raw field: trim tokens, drop empties.
pub fn split_listing(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a raw comma-separated `responsible` field into user ids.
pub fn parse_responsible(raw: &str) -> Vec<UserId> {
    split_listing(raw).into_iter().map(UserId).collect()
}
