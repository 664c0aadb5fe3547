//! Task CRUD, status changes and assignment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use worktrack_auth::AccessEvaluator;
use worktrack_core::error::AppError;
use worktrack_core::events::{DomainEvent, TaskEvent};
use worktrack_database::{
    Change, ProjectScope, Store, StoreManager, TaskQuery, TaskScope, UnitOfWork,
};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::permission::TaskAction;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskPriority, TaskStatus};
use worktrack_entity::user::UserRole;

use crate::context::RequestContext;
use crate::notification::{DueSoonGenerator, FanoutEngine};

/// Request to create one task per assignee.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    /// Owning project.
    pub project_id: Uuid,
    /// Task title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Assignees; empty creates one unassigned task.
    #[serde(default)]
    pub assigned_to: Vec<Uuid>,
    /// Priority, medium when omitted.
    pub priority: Option<TaskPriority>,
    /// Initial status, pending when omitted.
    pub status: Option<TaskStatus>,
    /// Due date.
    pub deadline: Option<DateTime<Utc>>,
}

/// Request to update a task. `deadline: Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New or cleared deadline.
    pub deadline: Option<Option<DateTime<Utc>>>,
    /// New status.
    pub status: Option<TaskStatus>,
}

/// Listing filters.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one status.
    pub status: Option<TaskStatus>,
}

/// Manages tasks.
#[derive(Debug, Clone)]
pub struct TaskService {
    store: Arc<StoreManager>,
    access: Arc<AccessEvaluator>,
    fanout: Arc<FanoutEngine>,
    due_soon: Arc<DueSoonGenerator>,
}

impl TaskService {
    /// Creates a new task service.
    pub fn new(
        store: Arc<StoreManager>,
        access: Arc<AccessEvaluator>,
        fanout: Arc<FanoutEngine>,
        due_soon: Arc<DueSoonGenerator>,
    ) -> Self {
        Self {
            store,
            access,
            fanout,
            due_soon,
        }
    }

    /// Lists the tasks the caller can read.
    ///
    /// Listing as a member also raises due-soon alerts for the caller's
    /// open tasks.
    pub async fn list(&self, ctx: &RequestContext, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        let mut projects: HashMap<Uuid, Project> = HashMap::new();
        let scope = match ctx.role() {
            UserRole::Admin => TaskScope::All,
            UserRole::Manager => {
                let involved = self
                    .store
                    .list_projects(ProjectScope::Involving(ctx.user_id()))
                    .await?;
                let project_ids = involved.iter().map(|p| p.id).collect();
                projects.extend(involved.into_iter().map(|p| (p.id, p)));
                TaskScope::ProjectsOrAssignee {
                    project_ids,
                    user_id: ctx.user_id(),
                }
            }
            UserRole::Member => TaskScope::Assignee(ctx.user_id()),
        };
        let query = TaskQuery {
            scope,
            project_id: filter.project_id,
            status: filter.status,
        };

        let candidates = self.store.list_tasks(&query).await?;
        let mut visible = Vec::with_capacity(candidates.len());
        for task in candidates {
            if !projects.contains_key(&task.project_id) {
                match self.store.find_project(task.project_id).await? {
                    Some(p) => {
                        projects.insert(p.id, p);
                    }
                    None => continue,
                }
            }
            let Some(project) = projects.get(&task.project_id) else {
                continue;
            };
            if self
                .access
                .task(&ctx.principal, project, task.assigned_to, TaskAction::Read)
                .is_allowed()
            {
                visible.push(task);
            }
        }

        if ctx.role() == UserRole::Member {
            self.due_soon
                .generate(ctx.user_id(), &visible, Utc::now())
                .await?;
        }
        debug!(user_id = %ctx.user_id(), count = visible.len(), "Listed tasks");
        Ok(visible)
    }

    /// Gets a single task.
    pub async fn get(&self, ctx: &RequestContext, task_id: Uuid) -> Result<Task, AppError> {
        let (task, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(task.id),
            task.assigned_to,
            TaskAction::Read,
        )?;
        Ok(task)
    }

    /// Creates one task per assignee, or a single unassigned task.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateTaskRequest,
    ) -> Result<Vec<Task>, AppError> {
        let project = self
            .store
            .find_project(req.project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;
        self.access
            .require_task(&ctx.principal, &project, None, None, TaskAction::Create)?;

        let title = require_title(&req.title)?;
        let mut assignees: Vec<Uuid> = Vec::with_capacity(req.assigned_to.len());
        for id in req.assigned_to {
            if !assignees.contains(&id) {
                check_assignee(&self.store, &project, id, "assignedTo").await?;
                assignees.push(id);
            }
        }
        let slots: Vec<Option<Uuid>> = if assignees.is_empty() {
            vec![None]
        } else {
            assignees.into_iter().map(Some).collect()
        };

        let now = Utc::now();
        let mut unit = UnitOfWork::new();
        let mut events = Vec::with_capacity(slots.len() + 1);
        let mut tasks = Vec::with_capacity(slots.len());
        for assigned_to in slots {
            let task = Task {
                id: Uuid::new_v4(),
                project_id: project.id,
                title: title.clone(),
                description: req.description.clone(),
                assigned_to,
                status: req.status.unwrap_or_default(),
                priority: req.priority.unwrap_or_default(),
                deadline: req.deadline,
                version: 1,
                created_by: ctx.user_id(),
                created_at: now,
                updated_at: now,
            };
            let mut entry = NewAuditEntry::new(AuditAction::TaskCreated, ctx.user_id())
                .project(project.id)
                .task(task.id)
                .details(json!({ "title": task.title, "priority": task.priority }))
                .at(now);
            if let Some(assignee_id) = assigned_to {
                entry = entry.affected_user(assignee_id);
                events.push(DomainEvent::at(
                    ctx.user_id(),
                    TaskEvent::Assigned {
                        task_id: task.id,
                        project_id: project.id,
                        title: task.title.clone(),
                        assignee_id,
                    }
                    .into(),
                    now,
                ));
            }
            unit.change(Change::InsertTask(task.clone())).audit(entry);
            tasks.push(task);
        }
        if let Some(first) = tasks.first() {
            events.push(DomainEvent::at(
                ctx.user_id(),
                TaskEvent::Created {
                    task_id: first.id,
                    project_id: project.id,
                    title: first.title.clone(),
                    manager_id: project.manager_id,
                }
                .into(),
                now,
            ));
        }

        let recipients = self.fanout.deliver(&mut unit, &events).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            project_id = %project.id,
            count = tasks.len(),
            recipients,
            "Tasks created"
        );
        Ok(tasks)
    }

    /// Updates task fields. A status change is recorded as a status change
    /// rather than a plain update.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        req: UpdateTaskRequest,
    ) -> Result<Task, AppError> {
        let (current, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(current.id),
            current.assigned_to,
            TaskAction::Update,
        )?;

        let mut updated = current.clone();
        if let Some(ref title) = req.title {
            updated.title = require_title(title)?;
        }
        if req.description.is_some() {
            updated.description = req.description;
        }
        if let Some(priority) = req.priority {
            updated.priority = priority;
        }
        if let Some(deadline) = req.deadline {
            updated.deadline = deadline;
        }
        if let Some(status) = req.status {
            updated.status = status;
        }

        let now = Utc::now();
        updated.version = current.version + 1;
        updated.updated_at = now;

        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateTask {
            task: updated.clone(),
            expected_version: current.version,
        });
        let event = if updated.status != current.status {
            unit.audit(status_audit(ctx, &current, updated.status, now));
            status_event(ctx, &project, &current, updated.status, now)
        } else {
            unit.audit(
                NewAuditEntry::new(AuditAction::TaskUpdated, ctx.user_id())
                    .project(project.id)
                    .task(updated.id)
                    .at(now),
            );
            DomainEvent::at(
                ctx.user_id(),
                TaskEvent::Updated {
                    task_id: updated.id,
                    project_id: project.id,
                    title: updated.title.clone(),
                    manager_id: project.manager_id,
                    assignee_id: updated.assigned_to,
                }
                .into(),
                now,
            )
        };
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(actor = %ctx.user_id(), task_id = %updated.id, recipients, "Task updated");
        Ok(updated)
    }

    /// Deletes a task and its progress log.
    pub async fn delete(&self, ctx: &RequestContext, task_id: Uuid) -> Result<Task, AppError> {
        let (task, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(task.id),
            task.assigned_to,
            TaskAction::Delete,
        )?;

        let now = Utc::now();
        let mut unit = UnitOfWork::new();
        unit.change(Change::DeleteTask {
            id: task.id,
            expected_version: task.version,
        })
        .audit(
            NewAuditEntry::new(AuditAction::TaskDeleted, ctx.user_id())
                .project(project.id)
                .task(task.id)
                .details(json!({ "title": task.title }))
                .at(now),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            TaskEvent::Deleted {
                task_id: task.id,
                project_id: project.id,
                title: task.title.clone(),
                manager_id: project.manager_id,
                assignee_id: task.assigned_to,
            }
            .into(),
            now,
        );
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(actor = %ctx.user_id(), task_id = %task.id, recipients, "Task deleted");
        Ok(task)
    }

    /// Sets the task status. Setting the current status changes nothing.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let (current, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(current.id),
            current.assigned_to,
            TaskAction::UpdateStatus,
        )?;

        if current.status == status {
            return Ok(current);
        }

        let now = Utc::now();
        let mut unit = UnitOfWork::new();
        let updated = push_status_change(&mut unit, ctx, &current, status, now);
        let event = status_event(ctx, &project, &current, status, now);
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            task_id = %updated.id,
            from = %current.status,
            to = %status,
            recipients,
            "Task status changed"
        );
        Ok(updated)
    }

    /// Assigns the task to a project member.
    pub async fn assign(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        assignee_id: Uuid,
    ) -> Result<Task, AppError> {
        let (current, project) = load_task(&self.store, task_id).await?;
        self.access.require_task(
            &ctx.principal,
            &project,
            Some(current.id),
            current.assigned_to,
            TaskAction::Assign,
        )?;
        check_assignee(&self.store, &project, assignee_id, "userId").await?;

        let now = Utc::now();
        let mut updated = current.clone();
        updated.assigned_to = Some(assignee_id);
        updated.version = current.version + 1;
        updated.updated_at = now;

        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateTask {
            task: updated.clone(),
            expected_version: current.version,
        })
        .audit(
            NewAuditEntry::new(AuditAction::TaskAssigned, ctx.user_id())
                .project(project.id)
                .task(updated.id)
                .affected_user(assignee_id)
                .details(json!({ "previousAssignee": current.assigned_to }))
                .at(now),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            TaskEvent::Assigned {
                task_id: updated.id,
                project_id: project.id,
                title: updated.title.clone(),
                assignee_id,
            }
            .into(),
            now,
        );
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            task_id = %updated.id,
            assignee = %assignee_id,
            recipients,
            "Task assigned"
        );
        Ok(updated)
    }
}

/// Load a task and its project. A task whose project vanished is treated as
/// missing.
pub(crate) async fn load_task(
    store: &StoreManager,
    task_id: Uuid,
) -> Result<(Task, Project), AppError> {
    let task = store
        .find_task(task_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    let project = store
        .find_project(task.project_id)
        .await?
        .ok_or_else(|| AppError::not_found("Task not found"))?;
    Ok((task, project))
}

/// Assignees must be active member-role users inside the project.
async fn check_assignee(
    store: &StoreManager,
    project: &Project,
    user_id: Uuid,
    field: &str,
) -> Result<(), AppError> {
    let user = store.find_user(user_id).await?;
    let eligible = user.is_some_and(|u| u.is_active && u.role == UserRole::Member);
    if !eligible {
        return Err(AppError::invalid_field(
            field,
            "Assignee must be an active member",
        ));
    }
    if !project.is_member(user_id) {
        return Err(AppError::invalid_field(
            field,
            "Assignee must belong to the project",
        ));
    }
    Ok(())
}

fn require_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::invalid_field("title", "Task title is required"));
    }
    Ok(title.to_string())
}

/// Queue a status-only update of `current` and its audit entry; returns the
/// new task state.
pub(crate) fn push_status_change(
    unit: &mut UnitOfWork,
    ctx: &RequestContext,
    current: &Task,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> Task {
    let mut updated = current.clone();
    updated.status = status;
    updated.version = current.version + 1;
    updated.updated_at = now;
    unit.change(Change::UpdateTask {
        task: updated.clone(),
        expected_version: current.version,
    })
    .audit(status_audit(ctx, current, status, now));
    updated
}

fn status_audit(
    ctx: &RequestContext,
    current: &Task,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> NewAuditEntry {
    NewAuditEntry::new(AuditAction::TaskStatusChanged, ctx.user_id())
        .project(current.project_id)
        .task(current.id)
        .details(json!({ "from": current.status, "to": status }))
        .at(now)
}

pub(crate) fn status_event(
    ctx: &RequestContext,
    project: &Project,
    current: &Task,
    status: TaskStatus,
    now: DateTime<Utc>,
) -> DomainEvent {
    DomainEvent::at(
        ctx.user_id(),
        TaskEvent::StatusChanged {
            task_id: current.id,
            project_id: project.id,
            title: current.title.clone(),
            manager_id: project.manager_id,
            assignee_id: current.assigned_to,
            old_status: current.status.to_string(),
            new_status: status.to_string(),
        }
        .into(),
        now,
    )
}
