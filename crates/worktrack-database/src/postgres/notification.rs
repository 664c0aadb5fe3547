//! Notification repository.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_entity::notification::Notification;

use super::write_err;

/// Repository for inbox rows.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A recipient's notifications, newest first; rows written by one unit
    /// share `created_at` and fall back to insertion order.
    pub async fn list(
        &self,
        recipient_id: Uuid,
        unread_only: bool,
        limit: u32,
    ) -> AppResult<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE recipient_id = $1 AND ($2 = FALSE OR is_read = FALSE) \
             ORDER BY created_at DESC, seq DESC LIMIT $3",
        )
        .bind(recipient_id)
        .bind(unread_only)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list notifications", e))
    }

    /// Count unread notifications for a recipient.
    pub async fn count_unread(&self, recipient_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count as u64)
    }

    /// Mark one notification read for its recipient.
    pub async fn mark_read(
        &self,
        id: Uuid,
        recipient_id: Uuid,
        at: DateTime<Utc>,
    ) -> AppResult<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND recipient_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(recipient_id)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))
    }

    /// Mark all unread notifications of a recipient read.
    pub async fn mark_all_read(&self, recipient_id: Uuid, at: DateTime<Utc>) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = $2 \
             WHERE recipient_id = $1 AND is_read = FALSE",
        )
        .bind(recipient_id)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark all read", e))?;
        Ok(result.rows_affected())
    }

    /// Insert unless the key or a recent notification of the same kind for
    /// the same recipient and task exists.
    pub async fn insert_once(
        &self,
        n: &Notification,
        suppress_since: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO notifications (id, recipient_id, message, kind, task_id, project_id, is_read, dedup_key, created_at) \
             SELECT $1::uuid, $2::uuid, $3::text, $4::text, $5::uuid, $6::uuid, FALSE, $7::text, $8::timestamptz \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM notifications \
                 WHERE recipient_id = $2 AND task_id IS NOT DISTINCT FROM $5 AND kind = $4 AND created_at > $9 \
             ) \
             ON CONFLICT (recipient_id, task_id, kind, dedup_key) WHERE dedup_key IS NOT NULL DO NOTHING",
        )
        .bind(n.id)
        .bind(n.recipient_id)
        .bind(&n.message)
        .bind(n.kind.as_str())
        .bind(n.task_id)
        .bind(n.project_id)
        .bind(&n.dedup_key)
        .bind(n.created_at)
        .bind(suppress_since)
        .execute(&self.pool)
        .await
        .map_err(write_err("Failed to insert keyed notification"))?;
        Ok(result.rows_affected() == 1)
    }

    /// Insert a notification inside a unit of work.
    pub async fn insert(conn: &mut PgConnection, n: &Notification) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notifications (id, recipient_id, message, kind, task_id, project_id, is_read, dedup_key, created_at, read_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(n.id)
        .bind(n.recipient_id)
        .bind(&n.message)
        .bind(n.kind.as_str())
        .bind(n.task_id)
        .bind(n.project_id)
        .bind(n.is_read)
        .bind(&n.dedup_key)
        .bind(n.created_at)
        .bind(n.read_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to create notification"))?;
        Ok(())
    }
}
