//! The task progress log chain.
//!
//! Entries are append-only. Appending with a declared status moves the task
//! to that status in the same unit of work.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use worktrack_auth::AccessEvaluator;
use worktrack_core::error::AppError;
use worktrack_core::events::{DomainEvent, TaskEvent};
use worktrack_database::{Change, Store, StoreManager, UnitOfWork};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::permission::TaskAction;
use worktrack_entity::task::{TaskLogEntry, TaskStatus};

use super::service::{load_task, push_status_change, status_event};
use crate::context::RequestContext;
use crate::notification::FanoutEngine;

/// Request to append a progress entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppendLogRequest {
    /// Progress note.
    pub content: String,
    /// Reported completion.
    pub progress_percent: Option<i32>,
    /// Status to move the task to.
    pub status: Option<TaskStatus>,
}

/// Reads and appends task progress entries.
#[derive(Debug, Clone)]
pub struct TaskLogService {
    store: Arc<StoreManager>,
    access: Arc<AccessEvaluator>,
    fanout: Arc<FanoutEngine>,
}

impl TaskLogService {
    /// Creates a new task log service.
    pub fn new(
        store: Arc<StoreManager>,
        access: Arc<AccessEvaluator>,
        fanout: Arc<FanoutEngine>,
    ) -> Self {
        Self {
            store,
            access,
            fanout,
        }
    }

    /// The task's entries, oldest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
    ) -> Result<Vec<TaskLogEntry>, AppError> {
        let (task, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(task.id),
            task.assigned_to,
            TaskAction::ReadLog,
        )?;
        self.store.list_task_logs(task.id).await
    }

    /// Appends an entry. Only the assignee may write.
    pub async fn append(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        req: AppendLogRequest,
    ) -> Result<TaskLogEntry, AppError> {
        let (task, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(task.id),
            task.assigned_to,
            TaskAction::AppendLog,
        )?;

        let content = req.content.trim();
        if content.is_empty() {
            return Err(AppError::invalid_field("content", "Log content is required"));
        }
        if let Some(p) = req.progress_percent
            && !(0..=100).contains(&p)
        {
            return Err(AppError::invalid_field(
                "progressPercent",
                "Progress must be between 0 and 100",
            ));
        }

        let now = Utc::now();
        let entry = TaskLogEntry {
            id: Uuid::new_v4(),
            task_id: task.id,
            author_id: ctx.user_id(),
            content: content.to_string(),
            progress_percent: req.progress_percent,
            status_at_entry: req.status,
            created_at: now,
            seq: 0,
        };

        let mut unit = UnitOfWork::new();
        unit.change(Change::AppendTaskLog(entry.clone())).audit(
            NewAuditEntry::new(AuditAction::TaskLogAdded, ctx.user_id())
                .project(project.id)
                .task(task.id)
                .details(json!({
                    "logId": entry.id,
                    "progressPercent": entry.progress_percent,
                }))
                .at(now),
        );
        let mut events = vec![DomainEvent::at(
            ctx.user_id(),
            TaskEvent::LogAdded {
                task_id: task.id,
                project_id: project.id,
                title: task.title.clone(),
                manager_id: project.manager_id,
                progress_percent: entry.progress_percent,
            }
            .into(),
            now,
        )];
        if let Some(status) = req.status
            && status != task.status
        {
            push_status_change(&mut unit, ctx, &task, status, now);
            events.push(status_event(ctx, &project, &task, status, now));
        }

        let recipients = self.fanout.deliver(&mut unit, &events).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            task_id = %task.id,
            log_id = %entry.id,
            recipients,
            "Task log appended"
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::CreateTaskRequest;
    use crate::testing::Fixture;
    use worktrack_core::error::ErrorKind;
    use worktrack_entity::notification::NotificationKind;
    use worktrack_entity::task::Task;

    async fn assigned_task(f: &Fixture) -> Task {
        f.tasks()
            .create(
                &Fixture::ctx(&f.manager),
                CreateTaskRequest {
                    project_id: f.project.id,
                    title: "Collect metrics".into(),
                    description: None,
                    assigned_to: vec![f.member.id],
                    priority: None,
                    status: None,
                    deadline: None,
                },
            )
            .await
            .unwrap()
            .remove(0)
    }

    fn note(content: &str) -> AppendLogRequest {
        AppendLogRequest {
            content: content.into(),
            progress_percent: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn test_only_assignee_appends() {
        let f = Fixture::new().await;
        let task = assigned_task(&f).await;
        let logs = f.logs();

        let err = logs
            .append(&Fixture::ctx(&f.manager), task.id, note("done"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let err = logs
            .append(&Fixture::ctx(&f.admin), task.id, note("done"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        logs.append(&Fixture::ctx(&f.member), task.id, note("done"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_content_yields_two_entries_in_order() {
        let f = Fixture::new().await;
        let task = assigned_task(&f).await;
        let logs = f.logs();
        let ctx = Fixture::ctx(&f.member);

        let first = logs.append(&ctx, task.id, note("same")).await.unwrap();
        let second = logs.append(&ctx, task.id, note("same")).await.unwrap();

        let chain = logs.list(&Fixture::ctx(&f.manager), task.id).await.unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[0].id, first.id);
        assert_eq!(chain[1].id, second.id);
    }

    #[tokio::test]
    async fn test_log_with_status_moves_task() {
        let f = Fixture::new().await;
        let task = assigned_task(&f).await;
        let req = AppendLogRequest {
            content: "halfway".into(),
            progress_percent: Some(50),
            status: Some(TaskStatus::InProgress),
        };
        f.logs()
            .append(&Fixture::ctx(&f.member), task.id, req)
            .await
            .unwrap();

        let stored = f.store.find_task(task.id).await.unwrap().unwrap();
        assert_eq!(stored.status, TaskStatus::InProgress);
        assert_eq!(stored.version, 2);
        assert_eq!(f.inbox_count(&f.manager, NotificationKind::TaskLogAdded).await, 1);
        assert_eq!(f.inbox_count(&f.manager, NotificationKind::TaskStatusChanged).await, 1);
        assert_eq!(f.inbox_count(&f.member, NotificationKind::TaskLogAdded).await, 0);
    }

    #[tokio::test]
    async fn test_append_validates_input() {
        let f = Fixture::new().await;
        let task = assigned_task(&f).await;
        let ctx = Fixture::ctx(&f.member);

        let err = f.logs().append(&ctx, task.id, note("   ")).await.unwrap_err();
        assert_eq!(err.field.as_deref(), Some("content"));

        let req = AppendLogRequest {
            content: "over".into(),
            progress_percent: Some(101),
            status: None,
        };
        let err = f.logs().append(&ctx, task.id, req).await.unwrap_err();
        assert_eq!(err.field.as_deref(), Some("progressPercent"));
    }
}
