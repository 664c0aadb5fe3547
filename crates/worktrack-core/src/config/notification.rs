//! Notification inbox and due-soon configuration.

use serde::{Deserialize, Serialize};

/// Settings for the notification inbox and the due-soon generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// How far ahead of a deadline a task counts as "due soon", and how
    /// long a due-soon alert suppresses a repeat for the same task.
    #[serde(default = "default_due_soon_window")]
    pub due_soon_window_hours: i64,
    /// Inbox page size when the client sends no `limit`.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: u32,
    /// Upper bound for a client-supplied `limit`.
    #[serde(default = "default_max_list_limit")]
    pub max_list_limit: u32,
}

impl NotificationConfig {
    /// Largest accepted due-soon window (30 days).
    pub const MAX_DUE_SOON_WINDOW_HOURS: i64 = 24 * 30;

    /// Clamp a requested inbox limit into `1..=max_list_limit`.
    pub fn clamp_limit(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_list_limit)
            .clamp(1, self.max_list_limit.max(1))
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            due_soon_window_hours: default_due_soon_window(),
            default_list_limit: default_list_limit(),
            max_list_limit: default_max_list_limit(),
        }
    }
}

fn default_due_soon_window() -> i64 {
    24
}

fn default_list_limit() -> u32 {
    50
}

fn default_max_list_limit() -> u32 {
    100
}
