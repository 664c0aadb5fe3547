//! Audit log entry entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::action::AuditAction;

/// An immutable audit log entry.
///
/// Total order is `(created_at, seq)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    /// Unique audit entry identifier.
    pub id: Uuid,
    /// Store-assigned insertion counter.
    pub seq: i64,
    /// The action that was performed.
    #[sqlx(try_from = "String")]
    pub action: AuditAction,
    /// The user who performed the action.
    pub performed_by: Uuid,
    /// Project involved, if any.
    pub project_id: Option<Uuid>,
    /// Task involved, if any.
    pub task_id: Option<Uuid>,
    /// User the action was applied to, if any.
    pub affected_user_id: Option<Uuid>,
    /// Additional details about the action.
    pub details: serde_json::Value,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

/// Data required to append a new audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditEntry {
    /// The action performed.
    pub action: AuditAction,
    /// The acting user.
    pub performed_by: Uuid,
    /// Project involved.
    pub project_id: Option<Uuid>,
    /// Task involved.
    pub task_id: Option<Uuid>,
    /// User the action was applied to.
    pub affected_user_id: Option<Uuid>,
    /// Additional details.
    pub details: serde_json::Value,
    /// When the action occurred.
    pub created_at: DateTime<Utc>,
}

impl NewAuditEntry {
    /// Start an entry for `action` performed by `performed_by` now.
    pub fn new(action: AuditAction, performed_by: Uuid) -> Self {
        Self {
            action,
            performed_by,
            project_id: None,
            task_id: None,
            affected_user_id: None,
            details: serde_json::Value::Object(serde_json::Map::new()),
            created_at: Utc::now(),
        }
    }

    /// Set the project reference.
    pub fn project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Set the task reference.
    pub fn task(mut self, task_id: Uuid) -> Self {
        self.task_id = Some(task_id);
        self
    }

    /// Set the affected user.
    pub fn affected_user(mut self, user_id: Uuid) -> Self {
        self.affected_user_id = Some(user_id);
        self
    }

    /// Attach structured details.
    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }

    /// Override the timestamp.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Materialize the stored row once the store assigned a sequence number.
    pub fn into_entry(self, seq: i64) -> AuditEntry {
        AuditEntry {
            id: Uuid::new_v4(),
            seq,
            action: self.action,
            performed_by: self.performed_by,
            project_id: self.project_id,
            task_id: self.task_id,
            affected_user_id: self.affected_user_id,
            details: self.details,
            created_at: self.created_at,
        }
    }
}

/// Search criteria for audit queries. Empty fields match everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditFilter {
    /// Restrict to these actions.
    pub actions: Vec<AuditAction>,
    /// Restrict to one performer.
    pub performed_by: Option<Uuid>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one task.
    pub task_id: Option<Uuid>,
}

impl AuditFilter {
    /// Check whether an entry satisfies every set criterion.
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        (self.actions.is_empty() || self.actions.contains(&entry.action))
            && self.performed_by.is_none_or(|id| entry.performed_by == id)
            && self.project_id.is_none_or(|id| entry.project_id == Some(id))
            && self.task_id.is_none_or(|id| entry.task_id == Some(id))
    }
}
