//! Task-record persistence and the due-date range query.

use super::Store;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use taskflow_core::error::TaskFlowError;
use taskflow_core::interval::parse_reminder_times;
use taskflow_core::task::{parse_responsible, DocumentId, TaskRecord, UserId};
use taskflow_core::traits::TaskStore;

/// Storage format for due dates. ISO ordering makes lexicographic TEXT
/// comparison equal to chronological comparison, which the half-open
/// range query relies on.
const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

type RecordRow = (
    String,         // rid
    Option<String>, // due_date
    String,         // reminder_times
    String,         // responsible
    String,         // content
    String,         // creator
    i64,            // done
);

fn record_from_row(row: RecordRow) -> TaskRecord {
    let (rid, due_date, reminder_times, responsible, content, creator, done) = row;
    TaskRecord {
        id: rid,
        due_date: due_date
            .and_then(|s| NaiveDateTime::parse_from_str(&s, DUE_DATE_FORMAT).ok()),
        reminder_intervals: parse_reminder_times(&reminder_times),
        responsible: parse_responsible(&responsible),
        content,
        creator: UserId(creator),
        done: done != 0,
    }
}

fn due_date_text(record: &TaskRecord) -> Option<String> {
    record
        .due_date
        .map(|d| d.format(DUE_DATE_FORMAT).to_string())
}

fn reminder_times_text(record: &TaskRecord) -> String {
    record
        .reminder_intervals
        .iter()
        .map(|k| k.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

fn responsible_text(record: &TaskRecord) -> String {
    record
        .responsible
        .iter()
        .map(|u| u.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

const SELECT_RECORD_FIELDS: &str =
    "SELECT rid, due_date, reminder_times, responsible, content, creator, done FROM task_records";

#[async_trait]
impl TaskStore for Store {
    async fn records(&self, doc: &DocumentId) -> Result<Vec<TaskRecord>, TaskFlowError> {
        let rows: Vec<RecordRow> = sqlx::query_as(&format!(
            "{SELECT_RECORD_FIELDS} WHERE document_id = ? ORDER BY rid"
        ))
        .bind(doc.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TaskFlowError::Store(format!("record listing failed: {e}")))?;
        Ok(rows.into_iter().map(record_from_row).collect())
    }

    async fn record(
        &self,
        doc: &DocumentId,
        id: &str,
    ) -> Result<Option<TaskRecord>, TaskFlowError> {
        let row: Option<RecordRow> = sqlx::query_as(&format!(
            "{SELECT_RECORD_FIELDS} WHERE document_id = ? AND rid = ?"
        ))
        .bind(doc.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TaskFlowError::Store(format!("record lookup failed: {e}")))?;
        Ok(row.map(record_from_row))
    }

    async fn document_content(&self, doc: &DocumentId) -> Result<Option<String>, TaskFlowError> {
        self.get_document_content(doc).await
    }

    async fn apply_plan(
        &self,
        doc: &DocumentId,
        content: &str,
        upserts: &[TaskRecord],
        delete_ids: &[String],
    ) -> Result<(), TaskFlowError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| TaskFlowError::Store(format!("transaction begin failed: {e}")))?;

        sqlx::query(
            "INSERT INTO documents (id, content, updated_at) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(id) DO UPDATE SET content = excluded.content, \
             updated_at = excluded.updated_at",
        )
        .bind(doc.as_str())
        .bind(content)
        .execute(&mut *tx)
        .await
        .map_err(|e| TaskFlowError::Store(format!("document write failed: {e}")))?;

        for record in upserts {
            sqlx::query(
                "INSERT INTO task_records \
                 (document_id, rid, due_date, reminder_times, responsible, content, creator, done) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
                 ON CONFLICT(document_id, rid) DO UPDATE SET \
                 due_date = excluded.due_date, \
                 reminder_times = excluded.reminder_times, \
                 responsible = excluded.responsible, \
                 content = excluded.content, \
                 done = excluded.done",
            )
            .bind(doc.as_str())
            .bind(&record.id)
            .bind(due_date_text(record))
            .bind(reminder_times_text(record))
            .bind(responsible_text(record))
            .bind(&record.content)
            .bind(record.creator.as_str())
            .bind(record.done as i64)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                TaskFlowError::Store(format!("record upsert failed for {}: {e}", record.id))
            })?;
        }

        for rid in delete_ids {
            sqlx::query("DELETE FROM task_records WHERE document_id = ? AND rid = ?")
                .bind(doc.as_str())
                .bind(rid)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    TaskFlowError::Store(format!("record delete failed for {rid}: {e}"))
                })?;
        }

        tx.commit()
            .await
            .map_err(|e| TaskFlowError::Store(format!("transaction commit failed: {e}")))?;
        Ok(())
    }

    async fn find_due_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<(DocumentId, TaskRecord)>, TaskFlowError> {
        let rows: Vec<(String, String, Option<String>, String, String, String, String, i64)> =
            sqlx::query_as(
                "SELECT document_id, rid, due_date, reminder_times, responsible, content, \
                 creator, done FROM task_records \
                 WHERE due_date IS NOT NULL AND due_date >= ? AND due_date < ? \
                 ORDER BY document_id, rid",
            )
            .bind(start.format(DUE_DATE_FORMAT).to_string())
            .bind(end.format(DUE_DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| TaskFlowError::Store(format!("due range query failed: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(document_id, rid, due, times, resp, content, creator, done)| {
                (
                    DocumentId(document_id),
                    record_from_row((rid, due, times, resp, content, creator, done)),
                )
            })
            .collect())
    }
}

impl Store {
    /// Number of persisted task records across all documents.
    pub async fn record_count(&self) -> Result<i64, TaskFlowError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_records")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskFlowError::Store(format!("record count failed: {e}")))?;
        Ok(count)
    }
}
