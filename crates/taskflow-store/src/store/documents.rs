//! Last-observed document text.
//!
//! The stored copy backs the skip-if-unchanged check and carries the id
//! writeback performed after reconciliation.

use super::Store;
use taskflow_core::error::TaskFlowError;
use taskflow_core::task::DocumentId;

impl Store {
    /// The last text stored for a document, if any.
    pub async fn get_document_content(
        &self,
        doc: &DocumentId,
    ) -> Result<Option<String>, TaskFlowError> {
        let row: Option<(String,)> = sqlx::query_as("SELECT content FROM documents WHERE id = ?")
            .bind(doc.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| TaskFlowError::Store(format!("document lookup failed: {e}")))?;
        Ok(row.map(|(content,)| content))
    }

    /// Insert or replace a document's text.
    pub async fn put_document_content(
        &self,
        doc: &DocumentId,
        content: &str,
    ) -> Result<(), TaskFlowError> {
        sqlx::query(
            "INSERT INTO documents (id, content, updated_at) \
             VALUES (?, ?, datetime('now')) \
             ON CONFLICT(id) DO UPDATE SET content = excluded.content, \
             updated_at = excluded.updated_at",
        )
        .bind(doc.as_str())
        .bind(content)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskFlowError::Store(format!("document write failed: {e}")))?;
        Ok(())
    }

    /// Number of stored documents.
    pub async fn document_count(&self) -> Result<i64, TaskFlowError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskFlowError::Store(format!("document count failed: {e}")))?;
        Ok(count)
    }
}
