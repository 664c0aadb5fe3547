//! Notification inbox.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use worktrack_core::config::NotificationConfig;
use worktrack_core::error::AppError;
use worktrack_database::{Store, StoreManager};
use worktrack_entity::notification::Notification;

use crate::context::RequestContext;

/// One inbox listing together with the unread total.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxPage {
    /// Notifications, newest first.
    pub items: Vec<Notification>,
    /// Unread notifications across the whole inbox.
    pub unread_count: u64,
}

/// Per-user read model over delivered notifications.
#[derive(Debug, Clone)]
pub struct NotificationService {
    store: Arc<StoreManager>,
    config: NotificationConfig,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<StoreManager>, config: NotificationConfig) -> Self {
        Self { store, config }
    }

    /// Lists the caller's notifications.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        limit: Option<u32>,
    ) -> Result<InboxPage, AppError> {
        let limit = self.config.clamp_limit(limit);
        let items = self
            .store
            .list_notifications(ctx.user_id(), unread_only, limit)
            .await?;
        let unread_count = self.store.count_unread(ctx.user_id()).await?;
        Ok(InboxPage {
            items,
            unread_count,
        })
    }

    /// Counts the caller's unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.store.count_unread(ctx.user_id()).await
    }

    /// Marks one of the caller's notifications read.
    ///
    /// Someone else's notification is indistinguishable from a missing one.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        notification_id: Uuid,
    ) -> Result<Notification, AppError> {
        self.store
            .mark_notification_read(notification_id, ctx.user_id(), Utc::now())
            .await?
            .ok_or_else(|| AppError::not_found("Notification not found"))
    }

    /// Marks every unread notification of the caller read.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        let count = self.store.mark_all_read(ctx.user_id(), Utc::now()).await?;
        info!(user_id = %ctx.user_id(), count, "Marked notifications read");
        Ok(count)
    }
}
