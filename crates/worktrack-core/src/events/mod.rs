//! Domain events emitted by WorkTrack mutations.
//!
//! Every event carries enough relationship state (project manager,
//! members, assignee) for the notification fanout to compute its
//! recipients without reloading anything from the store.

pub mod project;
pub mod task;
pub mod user;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use project::ProjectEvent;
pub use task::TaskEvent;
pub use user::UserEvent;

/// Wrapper for all domain events with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// When the event occurred.
    pub timestamp: DateTime<Utc>,
    /// The user who caused the event.
    pub actor_id: Uuid,
    /// The event payload.
    pub payload: EventPayload,
}

/// Union of all domain event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event")]
pub enum EventPayload {
    /// A task-related event.
    Task(TaskEvent),
    /// A project-related event.
    Project(ProjectEvent),
    /// A user-related event.
    User(UserEvent),
}

impl DomainEvent {
    /// Create a new domain event stamped with the current time.
    pub fn new(actor_id: Uuid, payload: EventPayload) -> Self {
        Self::at(actor_id, payload, Utc::now())
    }

    /// Create a new domain event with an explicit timestamp.
    pub fn at(actor_id: Uuid, payload: EventPayload, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp,
            actor_id,
            payload,
        }
    }

    /// Project the event refers to, if any.
    pub fn project_id(&self) -> Option<Uuid> {
        match &self.payload {
            EventPayload::Task(e) => Some(e.project_id()),
            EventPayload::Project(e) => Some(e.project_id()),
            EventPayload::User(_) => None,
        }
    }

    /// Task the event refers to, if any.
    pub fn task_id(&self) -> Option<Uuid> {
        match &self.payload {
            EventPayload::Task(e) => Some(e.task_id()),
            EventPayload::Project(_) | EventPayload::User(_) => None,
        }
    }
}

impl From<TaskEvent> for EventPayload {
    fn from(event: TaskEvent) -> Self {
        Self::Task(event)
    }
}

impl From<ProjectEvent> for EventPayload {
    fn from(event: ProjectEvent) -> Self {
        Self::Project(event)
    }
}

impl From<UserEvent> for EventPayload {
    fn from(event: UserEvent) -> Self {
        Self::User(event)
    }
}
