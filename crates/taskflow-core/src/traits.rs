use crate::error::TaskFlowError;
use crate::task::{DocumentId, TaskEvent, TaskRecord, UserId};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

/// Storage collaborator: documents and their task records.
///
/// Implementations are expected to serialize writes to a single document's
/// record set; the engine never coordinates across documents.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All task records owned by a document.
    async fn records(&self, doc: &DocumentId) -> Result<Vec<TaskRecord>, TaskFlowError>;

    /// Fetch one record by owning document and id.
    async fn record(&self, doc: &DocumentId, id: &str)
        -> Result<Option<TaskRecord>, TaskFlowError>;

    /// Last observed text for a document, if any was stored.
    async fn document_content(&self, doc: &DocumentId) -> Result<Option<String>, TaskFlowError>;

    /// Atomically persist one document's synchronization outcome: the new
    /// text, the records to insert or replace, and the stale ids to remove.
    /// A failure must leave the document untouched, never a partial commit.
    async fn apply_plan(
        &self,
        doc: &DocumentId,
        content: &str,
        upserts: &[TaskRecord],
        delete_ids: &[String],
    ) -> Result<(), TaskFlowError>;

    /// Records with a due date in `[start, end)`, across all documents.
    async fn find_due_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<(DocumentId, TaskRecord)>, TaskFlowError>;
}

/// Notification boundary. Delivery is a collaborator's problem.
///
/// Fire-and-forget from the engine's perspective: a failed notification is
/// logged by the caller and never aborts the remaining batch.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Issue one notification to one user about one task event.
    async fn notify(
        &self,
        doc: &DocumentId,
        user: &UserId,
        event: TaskEvent,
        params: BTreeMap<String, String>,
    ) -> Result<(), TaskFlowError>;
}
