//! Read-triggered due-soon alerts.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use worktrack_core::config::NotificationConfig;
use worktrack_core::result::AppResult;
use worktrack_database::{Store, StoreManager};
use worktrack_entity::notification::{Notification, NotificationKind};
use worktrack_entity::task::Task;

/// Idempotency key for a due-soon alert: one per UTC calendar day.
pub fn due_soon_key(now: DateTime<Utc>) -> String {
    format!("due_soon:{}", now.format("%Y-%m-%d"))
}

/// Emits at most one `due_soon` alert per (user, task) per window.
///
/// Alerts go to the assignee only. They are neither broadcast to admins
/// nor audited.
#[derive(Debug, Clone)]
pub struct DueSoonGenerator {
    store: Arc<StoreManager>,
    window: Duration,
}

impl DueSoonGenerator {
    /// Creates a generator using the configured window.
    pub fn new(store: Arc<StoreManager>, config: &NotificationConfig) -> Self {
        Self {
            store,
            window: Duration::hours(
                config
                    .due_soon_window_hours
                    .clamp(1, NotificationConfig::MAX_DUE_SOON_WINDOW_HOURS),
            ),
        }
    }

    /// The look-ahead window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Check `tasks` on behalf of `user_id` and insert the alerts that are
    /// due. Returns the number actually inserted.
    pub async fn generate(
        &self,
        user_id: Uuid,
        tasks: &[Task],
        now: DateTime<Utc>,
    ) -> AppResult<usize> {
        let key = due_soon_key(now);
        let suppress_since = now - self.window;
        let mut inserted = 0;

        for task in tasks
            .iter()
            .filter(|t| t.is_assignee(user_id) && t.is_due_within(now, self.window))
        {
            let mut alert = Notification::new(
                user_id,
                NotificationKind::DueSoon,
                format!("Task \"{}\" is due soon", task.title),
                now,
            )
            .with_refs(Some(task.project_id), Some(task.id));
            alert.dedup_key = Some(key.clone());

            if self
                .store
                .insert_notification_once(&alert, suppress_since)
                .await?
            {
                inserted += 1;
            } else {
                debug!(user_id = %user_id, task_id = %task.id, "Due-soon alert already sent");
            }
        }

        if inserted > 0 {
            info!(user_id = %user_id, count = inserted, "Generated due-soon alerts");
        }
        Ok(inserted)
    }
}
