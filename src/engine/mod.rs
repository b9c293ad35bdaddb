//! The engine wires the reconciler and the aggregator to the storage and
//! notification collaborators.
//!
//! Two triggers drive it: a document content change runs one
//! reconciliation pass for that document, and the hourly scheduler runs
//! one reminder pass across all documents. Each invocation is synchronous
//! and runs to completion; the only suspension points are the collaborator
//! calls.


use crate::directive;
use crate::remind::{self, DispatchGrouping};
use crate::sync;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::sync::Arc;
use taskflow_core::config::{SchedulerConfig, SyncConfig};
use taskflow_core::error::TaskFlowError;
use taskflow_core::task::{DocumentId, TaskEvent, UserId};
use taskflow_core::traits::{Notifier, TaskStore};
use tracing::{debug, error, info, warn};

/// Summary of one document synchronization pass.
#[derive(Debug, Default)]
pub struct SyncOutcome {
    /// The pass was skipped because the text was unchanged.
    pub skipped: bool,
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    /// The text as persisted, with any newly assigned ids embedded.
    pub content: String,
}

pub struct Engine {
    store: Arc<dyn TaskStore>,
    notifier: Arc<dyn Notifier>,
    sync_config: SyncConfig,
}

impl Engine {
    pub fn new(store: Arc<dyn TaskStore>, notifier: Arc<dyn Notifier>, sync_config: SyncConfig) -> Self {
        Self {
            store,
            notifier,
            sync_config,
        }
    }

    /// Handle a document content change: reconcile the directives found in
    /// the new text against the document's persisted records.
    ///
    /// Storage failures are fatal for the pass and propagate; notification
    /// failures are logged per recipient and never abort the batch.
    pub async fn on_document_changed(
        &self,
        doc: &DocumentId,
        new_content: &str,
        acting_user: &UserId,
    ) -> Result<SyncOutcome, TaskFlowError> {
        let stored = self.store.document_content(doc).await?;
        if stored.as_deref() == Some(new_content) {
            debug!("{doc}: content unchanged, skipping sync");
            return Ok(SyncOutcome {
                skipped: true,
                content: new_content.to_string(),
                ..SyncOutcome::default()
            });
        }

        let existing = self.store.records(doc).await?;

        // No directive marker at all: drop every record without parsing.
        if !directive::contains_directive(new_content) {
            let stale: Vec<String> = existing.iter().map(|r| r.id.clone()).collect();
            self.store.apply_plan(doc, new_content, &[], &stale).await?;
            if !stale.is_empty() {
                info!("{doc}: no directives left, removed {} record(s)", stale.len());
            }
            return Ok(SyncOutcome {
                deleted: stale.len(),
                content: new_content.to_string(),
                ..SyncOutcome::default()
            });
        }

        let directives = directive::scan(new_content);
        let plan = sync::reconcile(
            &directives,
            &existing,
            acting_user,
            &self.sync_config.date_format,
        );
        let content = directive::annotate_ids(new_content, &plan.id_assignments);

        self.store
            .apply_plan(doc, &content, &plan.upserts, &plan.stale_ids)
            .await?;

        let created = plan.created_ids.len();
        let updated = plan.upserts.len() - created;
        let deleted = plan.stale_ids.len();
        info!("{doc}: sync complete ({created} created, {updated} updated, {deleted} deleted)");

        for assignment in &plan.assignments {
            let mut params = BTreeMap::new();
            params.insert("taskContent".to_string(), assignment.content.clone());
            params.insert("taskCreator".to_string(), assignment.creator.to_string());
            params.insert(
                "taskUrl".to_string(),
                self.sync_config.task_url(doc, &assignment.task_id),
            );
            if let Err(e) = self
                .notifier
                .notify(doc, &assignment.user, TaskEvent::Assigned, params)
                .await
            {
                error!(
                    "{doc}: failed to notify {} about assigned task {}: {e}",
                    assignment.user, assignment.task_id
                );
            }
        }

        Ok(SyncOutcome {
            skipped: false,
            created,
            updated,
            deleted,
            content,
        })
    }

    /// The canonical batch contract: the dispatch grouping for `now`,
    /// empty when any window query failed.
    pub async fn due_reminders(&self, now: NaiveDateTime) -> DispatchGrouping {
        remind::due_reminders(self.store.as_ref(), now).await
    }

    /// One reminder pass: aggregate, then walk the grouping issuing one
    /// `expiring` notification per (interval, user, document, task id).
    ///
    /// Params are pulled fresh from the store at dispatch time so a record
    /// edited between aggregation and dispatch is not reported stale.
    pub async fn reminder_pass(&self, now: NaiveDateTime) -> DispatchGrouping {
        let grouping = self.due_reminders(now).await;

        for (interval, users) in &grouping {
            for (user, docs) in users {
                for (doc, task_ids) in docs {
                    for task_id in task_ids {
                        let record = match self.store.record(doc, task_id).await {
                            Ok(Some(record)) => record,
                            Ok(None) => {
                                warn!("{doc}#{task_id}: record vanished before dispatch");
                                continue;
                            }
                            Err(e) => {
                                error!("{doc}#{task_id}: dispatch-time lookup failed: {e}");
                                continue;
                            }
                        };

                        let mut params = BTreeMap::new();
                        params.insert("taskContent".to_string(), record.content.clone());
                        params.insert("taskCreator".to_string(), record.creator.to_string());
                        params.insert("taskUrl".to_string(), self.sync_config.task_url(doc, task_id));
                        if let Some(due) = record.due_date {
                            params.insert(
                                "taskDueDate".to_string(),
                                due.format(&self.sync_config.date_format).to_string(),
                            );
                        }

                        if let Err(e) = self
                            .notifier
                            .notify(doc, user, TaskEvent::Expiring, params)
                            .await
                        {
                            error!(
                                "failed to deliver {interval} reminder to {user} for {doc}#{task_id}: {e}"
                            );
                        }
                    }
                }
            }
        }

        grouping
    }

    /// Background task: run a reminder pass every poll interval.
    pub async fn scheduler_loop(self: Arc<Self>, config: SchedulerConfig) {
        info!(
            "reminder scheduler running (every {} minute(s))",
            config.poll_minutes
        );
        loop {
            let now = chrono::Local::now().naive_local();
            let grouping = self.reminder_pass(now).await;
            let delivered: usize = grouping
                .values()
                .flat_map(|users| users.values())
                .flat_map(|docs| docs.values())
                .map(|ids| ids.len())
                .sum();
            if delivered > 0 {
                info!("reminder pass complete: {delivered} notification(s)");
            } else {
                debug!("reminder pass complete: nothing due");
            }
            tokio::time::sleep(std::time::Duration::from_secs(config.poll_minutes * 60)).await;
        }
    }
}
