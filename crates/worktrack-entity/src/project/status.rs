//! Project status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    /// Work is ongoing.
    #[default]
    Active,
    /// Temporarily paused.
    OnHold,
    /// Finished.
    Completed,
}

impl ProjectStatus {
    /// Return the wire spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
