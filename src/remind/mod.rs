//! Reminder aggregation: which tasks need an `expiring` notification, for
//! whom, grouped for batched dispatch.
//!
//! The document-centric structure built from the window queries
//! (`interval → document → task id → responsible users`) is inverted into
//! the user-centric dispatch grouping (`interval → user → document → task
//! ids`) that the dispatch walk consumes.


use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use taskflow_core::interval::{reminder_windows, IntervalKey};
use taskflow_core::task::{DocumentId, UserId};
use taskflow_core::traits::TaskStore;
use tracing::error;

/// Task entries of one document, in discovery order: (task id, users).
pub type TaskUsers = Vec<(String, Vec<UserId>)>;

/// interval → document → task id → responsible users.
pub type DocumentCentric = BTreeMap<IntervalKey, BTreeMap<DocumentId, TaskUsers>>;

/// interval → user → document → ordered task ids.
pub type DispatchGrouping = BTreeMap<IntervalKey, BTreeMap<UserId, BTreeMap<DocumentId, Vec<String>>>>;

/// Build the document-centric structure by querying each reminder window.
///
/// A candidate qualifies for a window only when the window's key is among
/// its reminder intervals, its responsible list is non-empty, and its due
/// date is present and inside `[start, end)`. Failing records are silently
/// excluded. Any window's query failure fails the whole collection.
pub async fn collect_due(
    store: &dyn TaskStore,
    now: NaiveDateTime,
) -> Result<DocumentCentric, taskflow_core::error::TaskFlowError> {
    let mut by_interval = DocumentCentric::new();

    for window in reminder_windows(now) {
        let candidates = store.find_due_between(window.start, window.end).await?;

        let mut doc_map: BTreeMap<DocumentId, TaskUsers> = BTreeMap::new();
        for (doc, record) in candidates {
            if !record.reminder_intervals.contains(&window.key) {
                continue;
            }
            if record.responsible.is_empty() {
                continue;
            }
            let Some(due) = record.due_date else { continue };
            if !window.contains(due) {
                continue;
            }
            doc_map
                .entry(doc)
                .or_default()
                .push((record.id, record.responsible));
        }

        if !doc_map.is_empty() {
            by_interval.insert(window.key, doc_map);
        }
    }

    Ok(by_interval)
}

/// Invert the document-centric structure into the dispatch grouping.
///
/// Every (interval, document, task, user) tuple becomes an appended task
/// id under (interval, user, document); list order follows discovery
/// order. Buckets that end up empty are dropped.
pub fn invert(original: DocumentCentric) -> DispatchGrouping {
    let mut inverted = DispatchGrouping::new();

    for (interval, doc_map) in original {
        let mut user_map: BTreeMap<UserId, BTreeMap<DocumentId, Vec<String>>> = BTreeMap::new();

        for (doc, tasks) in doc_map {
            for (task_id, users) in tasks {
                for user in users {
                    user_map
                        .entry(user)
                        .or_default()
                        .entry(doc.clone())
                        .or_default()
                        .push(task_id.clone());
                }
            }
        }

        if !user_map.is_empty() {
            inverted.insert(interval, user_map);
        }
    }

    inverted
}

/// Compute the dispatch grouping for `now`.
///
/// Fail-closed: a single window's query failure suppresses the whole run
/// (empty grouping) rather than delivering a partial one; the next
/// scheduled pass retries.
pub async fn due_reminders(store: &dyn TaskStore, now: NaiveDateTime) -> DispatchGrouping {
    match collect_due(store, now).await {
        Ok(by_interval) => invert(by_interval),
        Err(e) => {
            error!("failed to collect due tasks, suppressing this reminder pass: {e}");
            DispatchGrouping::new()
        }
    }
}
