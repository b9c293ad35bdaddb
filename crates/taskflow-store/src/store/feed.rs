//! Notification feed, the in-app delivery boundary.
//!
//! Each notification issued by the engine lands here as one row; a reader
//! (UI, digest mailer) drains it on its own schedule.

use super::Store;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use taskflow_core::error::TaskFlowError;
use taskflow_core::task::{DocumentId, TaskEvent, UserId};
use taskflow_core::traits::Notifier;
use tracing::debug;

/// `Notifier` implementation that appends to the `notification_feed` table.
pub struct FeedNotifier {
    pool: SqlitePool,
}

impl FeedNotifier {
    /// Create a new feed notifier sharing the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Notifier for FeedNotifier {
    async fn notify(
        &self,
        doc: &DocumentId,
        user: &UserId,
        event: TaskEvent,
        params: BTreeMap<String, String>,
    ) -> Result<(), TaskFlowError> {
        let params_json = serde_json::to_string(&params)?;

        sqlx::query(
            "INSERT INTO notification_feed (document_id, user_id, event, params) \
             VALUES (?, ?, ?, ?)",
        )
        .bind(doc.as_str())
        .bind(user.as_str())
        .bind(event.as_str())
        .bind(&params_json)
        .execute(&self.pool)
        .await
        .map_err(|e| TaskFlowError::Notify(format!("feed write failed: {e}")))?;

        debug!("feed: {} {} [{}]", doc, user, event.as_str());
        Ok(())
    }
}

impl Store {
    /// Number of entries in the notification feed.
    pub async fn feed_count(&self) -> Result<i64, TaskFlowError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notification_feed")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| TaskFlowError::Store(format!("feed count failed: {e}")))?;
        Ok(count)
    }

    /// Most recent feed entries: (user, document, event, params JSON).
    pub async fn recent_feed(
        &self,
        limit: i64,
    ) -> Result<Vec<(String, String, String, String)>, TaskFlowError> {
        sqlx::query_as(
            "SELECT user_id, document_id, event, params FROM notification_feed \
             ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| TaskFlowError::Store(format!("feed listing failed: {e}")))
    }
}
