//! Directive reconciliation: planning the record changes for one document.
//!
//! `reconcile` is a pure function of the scanned directives and the
//! document's persisted records; the engine applies the returned plan
//! atomically and issues the queued notifications.

#[cfg(test)]
mod tests;

use crate::directive::Directive;
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};
use taskflow_core::interval::parse_reminder_times;
use taskflow_core::rid;
use taskflow_core::task::{parse_responsible, TaskRecord, UserId};
use tracing::warn;

/// An `assigned` notification owed to one responsible user of a newly
/// created record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignedNotification {
    pub task_id: String,
    pub user: UserId,
    pub content: String,
    pub creator: UserId,
}

/// The outcome of reconciling one document's directives.
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    /// Records to insert or replace. Unchanged records are not re-emitted.
    pub upserts: Vec<TaskRecord>,
    /// Persisted ids whose directives disappeared from the text.
    pub stale_ids: Vec<String>,
    /// Per scanned directive: the id freshly assigned to it, or `None`
    /// when it already carried a usable one. Feeds the text rewrite.
    pub id_assignments: Vec<Option<String>>,
    /// Every id seen in this pass.
    pub found_ids: BTreeSet<String>,
    /// Ids of records created in this pass.
    pub created_ids: BTreeSet<String>,
    /// Notification requests for newly created records.
    pub assignments: Vec<AssignedNotification>,
}

/// Reconcile the directives found in a document's text against its
/// persisted records.
///
/// Directives are processed in text order. A directive without an id (or
/// carrying a duplicate of an id an earlier directive already claimed)
/// gets a fresh one (first occurrence wins). A directive whose id has no
/// matching record becomes a creation with `done = false` and `creator`
/// set to the acting user; an existing record is updated only when
/// content, responsible, due date, or reminder intervals differ by value.
pub fn reconcile(
    directives: &[Directive],
    existing: &[TaskRecord],
    acting_user: &UserId,
    date_format: &str,
) -> ReconcilePlan {
    let existing_by_id: BTreeMap<&str, &TaskRecord> =
        existing.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut plan = ReconcilePlan::default();

    for directive in directives {
        let (id, assigned) = match directive.id.as_deref() {
            Some(id) if !plan.found_ids.contains(id) => (id.to_string(), None),
            _ => {
                let fresh = rid::generate();
                (fresh.clone(), Some(fresh))
            }
        };
        plan.id_assignments.push(assigned);
        plan.found_ids.insert(id.clone());

        let due_date = parse_due_date(&directive.due_date, date_format);
        let responsible = parse_responsible(&directive.responsible);
        let reminder_intervals = parse_reminder_times(&directive.reminder_times);

        match existing_by_id.get(id.as_str()) {
            Some(record) => {
                if record.content != directive.content
                    || record.responsible != responsible
                    || record.due_date != due_date
                    || record.reminder_intervals != reminder_intervals
                {
                    let mut updated = (*record).clone();
                    updated.content = directive.content.clone();
                    updated.responsible = responsible;
                    updated.due_date = due_date;
                    updated.reminder_intervals = reminder_intervals;
                    plan.upserts.push(updated);
                }
            }
            None => {
                for user in &responsible {
                    plan.assignments.push(AssignedNotification {
                        task_id: id.clone(),
                        user: user.clone(),
                        content: directive.content.clone(),
                        creator: acting_user.clone(),
                    });
                }
                plan.created_ids.insert(id.clone());
                plan.upserts.push(TaskRecord {
                    id,
                    due_date,
                    reminder_intervals,
                    responsible,
                    content: directive.content.clone(),
                    creator: acting_user.clone(),
                    done: false,
                });
            }
        }
    }

    plan.stale_ids = existing
        .iter()
        .filter(|r| !plan.found_ids.contains(&r.id))
        .map(|r| r.id.clone())
        .collect();

    plan
}

/// Parse a raw due-date string with the configured format. A blank field
/// means "no due date"; a malformed one is logged and dropped, never an
/// error.
fn parse_due_date(raw: &str, format: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDateTime::parse_from_str(raw, format) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("cannot parse directive dueDate '{raw}': {e}");
            None
        }
    }
}
