//! In-memory [`Store`] implementation.
//!
//! All state lives behind one `tokio::sync::RwLock`. A commit first checks
//! every version and existence precondition of the unit against the
//! current state, then applies the unit in place. Only those checks can
//! fail, so a rejected unit leaves nothing behind.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use worktrack_core::error::AppError;
use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::{AuditEntry, AuditFilter};
use worktrack_entity::notification::Notification;
use worktrack_entity::project::Project;
use worktrack_entity::task::{Task, TaskLogEntry};
use worktrack_entity::user::{User, UserRole};

use crate::store::{ProjectScope, Store, TaskQuery};
use crate::unit_of_work::{Change, UnitOfWork};

type DedupKey = (Uuid, Option<Uuid>, String, String);

#[derive(Debug, Default)]
struct State {
    users: HashMap<Uuid, User>,
    projects: HashMap<Uuid, Project>,
    tasks: HashMap<Uuid, Task>,
    logs: Vec<TaskLogEntry>,
    audit: Vec<AuditEntry>,
    notifications: Vec<Notification>,
    dedup_keys: HashSet<DedupKey>,
    next_log_seq: i64,
    next_audit_seq: i64,
}

/// Effects of the changes checked so far, layered over the stored state
/// while a unit is being checked. `None` marks a deletion.
#[derive(Default)]
struct Pending<'a> {
    usernames: HashSet<&'a str>,
    users: HashSet<Uuid>,
    projects: HashMap<Uuid, Option<i64>>,
    tasks: HashMap<Uuid, Option<(Uuid, i64)>>,
    dedup_keys: HashSet<DedupKey>,
}

impl State {
    fn project_version(&self, pending: &Pending<'_>, id: Uuid) -> Option<i64> {
        match pending.projects.get(&id) {
            Some(version) => *version,
            None => self.projects.get(&id).map(|p| p.version),
        }
    }

    fn task_version(&self, pending: &Pending<'_>, id: Uuid) -> Option<i64> {
        let (project_id, version) = match pending.tasks.get(&id) {
            Some(entry) => (*entry)?,
            None => self.tasks.get(&id).map(|t| (t.project_id, t.version))?,
        };
        // Deleting a project removes its tasks.
        if matches!(pending.projects.get(&project_id), Some(None)) {
            return None;
        }
        Some(version)
    }

    /// Verify that every change of the unit can be applied, in order.
    fn check(&self, unit: &UnitOfWork) -> AppResult<()> {
        let mut pending = Pending::default();
        for change in &unit.changes {
            match change {
                Change::InsertUser(user) => {
                    let taken = pending.usernames.contains(user.username.as_str())
                        || self.users.values().any(|u| u.username == user.username);
                    if taken {
                        return Err(AppError::conflict(format!(
                            "Username '{}' is already taken",
                            user.username
                        )));
                    }
                    pending.usernames.insert(&user.username);
                    pending.users.insert(user.id);
                }
                Change::UpdateUser(user) => {
                    if !self.users.contains_key(&user.id) && !pending.users.contains(&user.id) {
                        return Err(AppError::not_found("User not found"));
                    }
                }
                Change::InsertProject(project) => {
                    pending.projects.insert(project.id, Some(project.version));
                }
                Change::UpdateProject {
                    project,
                    expected_version,
                } => {
                    check_version(
                        self.project_version(&pending, project.id),
                        *expected_version,
                        "Project",
                    )?;
                    pending.projects.insert(project.id, Some(project.version));
                }
                Change::DeleteProject {
                    id,
                    expected_version,
                } => {
                    check_version(self.project_version(&pending, *id), *expected_version, "Project")?;
                    pending.projects.insert(*id, None);
                }
                Change::InsertTask(task) => {
                    if self.project_version(&pending, task.project_id).is_none() {
                        return Err(AppError::not_found("Project not found"));
                    }
                    pending
                        .tasks
                        .insert(task.id, Some((task.project_id, task.version)));
                }
                Change::UpdateTask {
                    task,
                    expected_version,
                } => {
                    check_version(self.task_version(&pending, task.id), *expected_version, "Task")?;
                    pending
                        .tasks
                        .insert(task.id, Some((task.project_id, task.version)));
                }
                Change::DeleteTask {
                    id,
                    expected_version,
                } => {
                    check_version(self.task_version(&pending, *id), *expected_version, "Task")?;
                    pending.tasks.insert(*id, None);
                }
                Change::AppendTaskLog(entry) => {
                    if self.task_version(&pending, entry.task_id).is_none() {
                        return Err(AppError::not_found("Task not found"));
                    }
                }
            }
        }

        for n in &unit.notifications {
            if let Some(k) = dedup_key(n) {
                if self.dedup_keys.contains(&k) || !pending.dedup_keys.insert(k) {
                    return Err(AppError::conflict("Duplicate notification key"));
                }
            }
        }
        Ok(())
    }

    /// Apply a change that [`State::check`] accepted.
    fn apply(&mut self, change: Change) {
        match change {
            Change::InsertUser(user) | Change::UpdateUser(user) => {
                self.users.insert(user.id, user);
            }
            Change::InsertProject(project) | Change::UpdateProject { project, .. } => {
                self.projects.insert(project.id, project);
            }
            Change::DeleteProject { id, .. } => {
                self.projects.remove(&id);
                let removed: HashSet<Uuid> = self
                    .tasks
                    .values()
                    .filter(|t| t.project_id == id)
                    .map(|t| t.id)
                    .collect();
                self.tasks.retain(|_, t| t.project_id != id);
                self.logs.retain(|l| !removed.contains(&l.task_id));
            }
            Change::InsertTask(task) | Change::UpdateTask { task, .. } => {
                self.tasks.insert(task.id, task);
            }
            Change::DeleteTask { id, .. } => {
                self.tasks.remove(&id);
                self.logs.retain(|l| l.task_id != id);
            }
            Change::AppendTaskLog(mut entry) => {
                self.next_log_seq += 1;
                entry.seq = self.next_log_seq;
                self.logs.push(entry);
            }
        }
    }
}

fn check_version(current: Option<i64>, expected: i64, what: &str) -> AppResult<()> {
    match current {
        Some(v) if v == expected => Ok(()),
        _ => Err(AppError::conflict(format!(
            "{what} was modified concurrently; reload and retry"
        ))),
    }
}

fn dedup_key(n: &Notification) -> Option<DedupKey> {
    n.dedup_key
        .as_ref()
        .map(|key| (n.recipient_id, n.task_id, n.kind.as_str().to_string(), key.clone()))
}

/// Store backed by process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<State>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        let state = self.state.read().await;
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }

    async fn active_admin_ids(&self) -> AppResult<Vec<Uuid>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .filter(|u| u.is_active && u.role == UserRole::Admin)
            .map(|u| u.id)
            .collect())
    }

    async fn find_project(&self, id: Uuid) -> AppResult<Option<Project>> {
        Ok(self.state.read().await.projects.get(&id).cloned())
    }

    async fn list_projects(&self, scope: ProjectScope) -> AppResult<Vec<Project>> {
        let state = self.state.read().await;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|p| match scope {
                ProjectScope::All => true,
                ProjectScope::Involving(user_id) => p.is_manager(user_id) || p.is_member(user_id),
            })
            .cloned()
            .collect();
        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    async fn find_task(&self, id: Uuid) -> AppResult<Option<Task>> {
        Ok(self.state.read().await.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, query: &TaskQuery) -> AppResult<Vec<Task>> {
        let state = self.state.read().await;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|t| query.matches(t))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn list_task_logs(&self, task_id: Uuid) -> AppResult<Vec<TaskLogEntry>> {
        let state = self.state.read().await;
        let mut logs: Vec<TaskLogEntry> = state
            .logs
            .iter()
            .filter(|l| l.task_id == task_id)
            .cloned()
            .collect();
        logs.sort_by_key(|l| (l.created_at, l.seq));
        Ok(logs)
    }

    async fn search_audit(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let state = self.state.read().await;
        let mut matching: Vec<&AuditEntry> =
            state.audit.iter().filter(|e| filter.matches(e)).collect();
        matching.sort_by(|a, b| (b.created_at, b.seq).cmp(&(a.created_at, a.seq)));
        let total = matching.len() as u64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();
        Ok(PageResponse::new(items, page.page, page.page_size, total))
    }

    async fn list_notifications(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        let state = self.state.read().await;
        // Insertion order breaks timestamp ties.
        let mut items: Vec<(usize, &Notification)> = state
            .notifications
            .iter()
            .enumerate()
            .filter(|(_, n)| n.recipient_id == recipient_id && (!unread_only || n.is_unread()))
            .collect();
        items.sort_by(|(ia, a), (ib, b)| (b.created_at, ib).cmp(&(a.created_at, ia)));
        Ok(items
            .into_iter()
            .take(limit as usize)
            .map(|(_, n)| n.clone())
            .collect())
    }

    async fn count_unread(&self, recipient_id: Uuid) -> AppResult<u64> {
        let state = self.state.read().await;
        Ok(state
            .notifications
            .iter()
            .filter(|n| n.recipient_id == recipient_id && n.is_unread())
            .count() as u64)
    }

    async fn mark_notification_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        let mut state = self.state.write().await;
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.id == id && n.recipient_id == recipient_id)
            .map(|n| {
                n.mark_read(at);
                n.clone()
            }))
    }

    async fn mark_all_read(&self, recipient_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let mut count = 0;
        for n in state
            .notifications
            .iter_mut()
            .filter(|n| n.recipient_id == recipient_id && n.is_unread())
        {
            n.mark_read(at);
            count += 1;
        }
        Ok(count)
    }

    async fn insert_notification_once(
        &self,
        notification: &Notification,
        suppress_since: DateTime<Utc>,
    ) -> AppResult<bool> {
        let mut state = self.state.write().await;
        let key = dedup_key(notification);
        if key.as_ref().is_some_and(|k| state.dedup_keys.contains(k)) {
            return Ok(false);
        }
        let recent = state.notifications.iter().any(|n| {
            n.recipient_id == notification.recipient_id
                && n.task_id == notification.task_id
                && n.kind == notification.kind
                && n.created_at > suppress_since
        });
        if recent {
            return Ok(false);
        }
        if let Some(k) = key {
            state.dedup_keys.insert(k);
        }
        state.notifications.push(notification.clone());
        Ok(true)
    }

    async fn commit(&self, unit: UnitOfWork) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.check(&unit)?;

        let changes = unit.changes.len();
        for change in unit.changes {
            state.apply(change);
        }
        for entry in unit.audit {
            state.next_audit_seq += 1;
            let seq = state.next_audit_seq;
            state.audit.push(entry.into_entry(seq));
        }
        let notifications = unit.notifications.len();
        for n in unit.notifications {
            if let Some(k) = dedup_key(&n) {
                state.dedup_keys.insert(k);
            }
            state.notifications.push(n);
        }

        debug!(changes, notifications, "Committed unit of work");
        Ok(())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
