//! Task progress log entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::TaskStatus;

/// One immutable entry of a task's progress chain.
///
/// Entries are ordered by `(created_at, seq)`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TaskLogEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The task this entry belongs to.
    pub task_id: Uuid,
    /// The assignee who wrote the entry.
    pub author_id: Uuid,
    /// Progress note.
    pub content: String,
    /// Reported completion, 0..=100.
    pub progress_percent: Option<i32>,
    /// Status declared with this entry.
    pub status_at_entry: Option<TaskStatus>,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Store-assigned insertion counter.
    #[serde(skip)]
    pub seq: i64,
}
