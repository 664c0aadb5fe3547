//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A notification delivered to one user's inbox.
///
/// Only `is_read` and `read_at` change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub recipient_id: Uuid,
    /// Human-readable text.
    pub message: String,
    /// What the notification is about.
    #[sqlx(try_from = "String")]
    pub kind: NotificationKind,
    /// Task involved, if any.
    pub task_id: Option<Uuid>,
    /// Project involved, if any.
    pub project_id: Option<Uuid>,
    /// Whether the recipient has read it.
    pub is_read: bool,
    /// Idempotency key, set for due-soon alerts only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedup_key: Option<String>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
}

impl Notification {
    /// Build an unread notification.
    pub fn new(
        recipient_id: Uuid,
        kind: NotificationKind,
        message: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            message: message.into(),
            kind,
            task_id: None,
            project_id: None,
            is_read: false,
            dedup_key: None,
            created_at,
            read_at: None,
        }
    }

    /// Attach the task and project references.
    pub fn with_refs(mut self, project_id: Option<Uuid>, task_id: Option<Uuid>) -> Self {
        self.project_id = project_id;
        self.task_id = task_id;
        self
    }

    /// Check if the notification is unread.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }

    /// Flag as read, keeping the first read time.
    pub fn mark_read(&mut self, at: DateTime<Utc>) {
        if !self.is_read {
            self.is_read = true;
            self.read_at = Some(at);
        }
    }
}
