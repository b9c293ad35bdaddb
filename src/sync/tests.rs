use super::*;
use crate::directive::Directive;
use taskflow_core::interval::IntervalKey;

const FORMAT: &str = "%Y/%m/%d %H:%M";

fn directive(id: Option<&str>, due: &str, responsible: &str, times: &str, body: &str) -> Directive {
    Directive {
        id: id.map(str::to_string),
        due_date: due.to_string(),
        responsible: responsible.to_string(),
        reminder_times: times.to_string(),
        content: body.to_string(),
    }
}

fn apply(existing: &[TaskRecord], plan: &ReconcilePlan) -> Vec<TaskRecord> {
    let mut records: Vec<TaskRecord> = existing
        .iter()
        .filter(|r| !plan.stale_ids.contains(&r.id))
        .cloned()
        .collect();
    for upsert in &plan.upserts {
        if let Some(slot) = records.iter_mut().find(|r| r.id == upsert.id) {
            *slot = upsert.clone();
        } else {
            records.push(upsert.clone());
        }
    }
    records
}

#[test]
fn test_creation_assigns_id_and_defaults() {
    let d = directive(None, "2025/01/01 09:00", "alice,bob", "h1,d2", "Review the draft");
    let plan = reconcile(&[d], &[], &UserId::from("carol"), FORMAT);

    assert_eq!(plan.upserts.len(), 1);
    let record = &plan.upserts[0];
    assert!(!record.done);
    assert_eq!(record.creator, UserId::from("carol"));
    assert_eq!(
        record.responsible,
        vec![UserId::from("alice"), UserId::from("bob")]
    );
    assert!(record.reminder_intervals.contains(&IntervalKey::H1));
    assert!(record.due_date.is_some());

    // The fresh id is reported for writeback and marked found.
    assert_eq!(plan.id_assignments.len(), 1);
    assert_eq!(plan.id_assignments[0].as_deref(), Some(record.id.as_str()));
    assert!(plan.found_ids.contains(&record.id));
    assert!(plan.created_ids.contains(&record.id));
}

#[test]
fn test_creation_fans_out_assigned_notifications() {
    let d = directive(None, "", "alice, bob ,carol", "", "Ship it");
    let plan = reconcile(&[d], &[], &UserId::from("dave"), FORMAT);

    assert_eq!(plan.assignments.len(), 3);
    for assignment in &plan.assignments {
        assert_eq!(assignment.content, "Ship it");
        assert_eq!(assignment.creator, UserId::from("dave"));
        assert_eq!(assignment.task_id, plan.upserts[0].id);
    }
}

#[test]
fn test_idempotence() {
    let d = directive(None, "2025/01/01 09:00", "alice", "h1", "Review");
    let first = reconcile(&[d], &[], &UserId::from("carol"), FORMAT);
    let records = apply(&[], &first);

    // Second pass: same directive, now carrying the assigned id.
    let id = first.upserts[0].id.clone();
    let same = directive(Some(&id), "2025/01/01 09:00", "alice", "h1", "Review");
    let second = reconcile(&[same], &records, &UserId::from("carol"), FORMAT);

    assert!(second.upserts.is_empty());
    assert!(second.stale_ids.is_empty());
    assert!(second.assignments.is_empty());
    assert_eq!(second.id_assignments, vec![None]);
}

#[test]
fn test_stable_identity_across_passes() {
    let d = directive(Some("abc-123"), "", "alice", "", "Review");
    let first = reconcile(&[d.clone()], &[], &UserId::from("carol"), FORMAT);
    let records = apply(&[], &first);
    assert_eq!(records[0].id, "abc-123");

    let mut changed = d;
    changed.content = "Review again".to_string();
    let second = reconcile(&[changed], &records, &UserId::from("carol"), FORMAT);
    assert_eq!(second.upserts.len(), 1);
    assert_eq!(second.upserts[0].id, "abc-123");
    // An update, not a creation: no assigned notifications.
    assert!(second.assignments.is_empty());
    assert!(second.created_ids.is_empty());
}

#[test]
fn test_update_preserves_creator_and_done() {
    let d = directive(Some("abc-123"), "", "alice", "", "Review");
    let mut records = apply(&[], &reconcile(&[d.clone()], &[], &UserId::from("carol"), FORMAT));
    records[0].done = true;

    let mut changed = d;
    changed.responsible = "bob".to_string();
    let plan = reconcile(&[changed], &records, &UserId::from("mallory"), FORMAT);

    assert_eq!(plan.upserts.len(), 1);
    assert_eq!(plan.upserts[0].creator, UserId::from("carol"));
    assert!(plan.upserts[0].done);
}

#[test]
fn test_stale_cleanup() {
    let keep = directive(Some("keep-1"), "", "alice", "", "Keep");
    let gone = directive(Some("gone-2"), "", "alice", "", "Gone");
    let records = apply(
        &[],
        &reconcile(&[keep.clone(), gone], &[], &UserId::from("carol"), FORMAT),
    );

    let plan = reconcile(&[keep], &records, &UserId::from("carol"), FORMAT);
    assert_eq!(plan.stale_ids, vec!["gone-2".to_string()]);
    let after = apply(&records, &plan);
    assert_eq!(after.len(), 1);
    assert_eq!(after[0].id, "keep-1");
}

#[test]
fn test_duplicate_id_first_occurrence_wins() {
    let a = directive(Some("dup-1"), "", "alice", "", "First");
    let b = directive(Some("dup-1"), "", "bob", "", "Second");
    let plan = reconcile(&[a, b], &[], &UserId::from("carol"), FORMAT);

    // The second directive is re-identified, not merged into the first.
    assert_eq!(plan.id_assignments[0], None);
    assert!(plan.id_assignments[1].is_some());
    assert_eq!(plan.upserts.len(), 2);
    assert_eq!(plan.upserts[0].id, "dup-1");
    assert_ne!(plan.upserts[1].id, "dup-1");
    assert_eq!(plan.found_ids.len(), 2);
}

#[test]
fn test_malformed_due_date_becomes_absent() {
    let d = directive(Some("abc-1"), "not a date", "alice", "", "Review");
    let plan = reconcile(&[d], &[], &UserId::from("carol"), FORMAT);
    assert_eq!(plan.upserts[0].due_date, None);
}

#[test]
fn test_due_date_change_is_detected() {
    let d = directive(Some("abc-1"), "2025/01/01 09:00", "alice", "h1", "Review");
    let records = apply(&[], &reconcile(&[d.clone()], &[], &UserId::from("carol"), FORMAT));

    let mut moved = d;
    moved.due_date = "2025/01/02 09:00".to_string();
    let plan = reconcile(&[moved], &records, &UserId::from("carol"), FORMAT);
    assert_eq!(plan.upserts.len(), 1);
    assert_eq!(
        plan.upserts[0].due_date.unwrap().format(FORMAT).to_string(),
        "2025/01/02 09:00"
    );
}

#[test]
fn test_empty_document_marks_everything_stale() {
    let d = directive(Some("abc-1"), "", "alice", "", "Review");
    let records = apply(&[], &reconcile(&[d], &[], &UserId::from("carol"), FORMAT));

    let plan = reconcile(&[], &records, &UserId::from("carol"), FORMAT);
    assert!(plan.upserts.is_empty());
    assert_eq!(plan.stale_ids, vec!["abc-1".to_string()]);
}
