//! Recipient resolution for domain events.
//!
//! Recipient selection is a pure function of the event and the set of
//! active admins. [`FanoutEngine`] wraps it with the one store read it
//! needs and appends the resulting notifications to a unit of work.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use worktrack_core::events::{DomainEvent, EventPayload, ProjectEvent, TaskEvent, UserEvent};
use worktrack_core::result::AppResult;
use worktrack_database::{Store, StoreManager, UnitOfWork};
use worktrack_entity::notification::{Notification, NotificationKind};

/// The notification kind an event produces.
pub fn kind_of(event: &DomainEvent) -> NotificationKind {
    match &event.payload {
        EventPayload::Task(e) => match e {
            TaskEvent::Created { .. } => NotificationKind::TaskCreated,
            TaskEvent::Assigned { .. } => NotificationKind::TaskAssigned,
            TaskEvent::Updated { .. } => NotificationKind::TaskUpdated,
            TaskEvent::StatusChanged { .. } => NotificationKind::TaskStatusChanged,
            TaskEvent::Deleted { .. } => NotificationKind::TaskDeleted,
            TaskEvent::LogAdded { .. } => NotificationKind::TaskLogAdded,
        },
        EventPayload::Project(e) => match e {
            ProjectEvent::Created { .. } => NotificationKind::ProjectCreated,
            ProjectEvent::Updated { .. } => NotificationKind::ProjectUpdated,
            ProjectEvent::MemberAdded { .. } => NotificationKind::ProjectMemberAdded,
            ProjectEvent::MemberRemoved { .. } => NotificationKind::ProjectMemberRemoved,
            ProjectEvent::Deleted { .. } => NotificationKind::ProjectDeleted,
        },
        EventPayload::User(e) => match e {
            UserEvent::Created { .. } => NotificationKind::UserCreated,
            UserEvent::Updated { .. } => NotificationKind::UserUpdated,
            UserEvent::Deleted { .. } => NotificationKind::UserDeleted,
        },
    }
}

/// Human-readable text for an event.
pub fn message_for(event: &DomainEvent) -> String {
    match &event.payload {
        EventPayload::Task(e) => {
            let title = e.title();
            match e {
                TaskEvent::Created { .. } => format!("New task \"{title}\" was created"),
                TaskEvent::Assigned { .. } => format!("Task \"{title}\" was assigned"),
                TaskEvent::Updated { .. } => format!("Task \"{title}\" was updated"),
                TaskEvent::StatusChanged {
                    old_status,
                    new_status,
                    ..
                } => format!("Task \"{title}\" moved from {old_status} to {new_status}"),
                TaskEvent::Deleted { .. } => format!("Task \"{title}\" was deleted"),
                TaskEvent::LogAdded {
                    progress_percent: Some(p),
                    ..
                } => format!("Progress update on task \"{title}\" ({p}%)"),
                TaskEvent::LogAdded { .. } => format!("Progress update on task \"{title}\""),
            }
        }
        EventPayload::Project(e) => {
            let name = e.name();
            match e {
                ProjectEvent::Created { .. } => format!("Project \"{name}\" was created"),
                ProjectEvent::Updated { .. } => format!("Project \"{name}\" was updated"),
                ProjectEvent::MemberAdded { .. } => {
                    format!("A member was added to project \"{name}\"")
                }
                ProjectEvent::MemberRemoved { .. } => {
                    format!("A member was removed from project \"{name}\"")
                }
                ProjectEvent::Deleted { .. } => format!("Project \"{name}\" was deleted"),
            }
        }
        EventPayload::User(e) => match e {
            UserEvent::Created { username, role, .. } => {
                format!("User \"{username}\" was created as {role}")
            }
            UserEvent::Updated { username, .. } => format!("User \"{username}\" was updated"),
            UserEvent::Deleted { username, .. } => format!("User \"{username}\" was deactivated"),
        },
    }
}

/// Recipients chosen by the event itself, before the admin broadcast.
pub fn direct_recipients(event: &DomainEvent) -> BTreeSet<Uuid> {
    let actor = event.actor_id;
    let mut set = BTreeSet::new();
    match &event.payload {
        EventPayload::Task(e) => match e {
            TaskEvent::Created { manager_id, .. } => {
                set.insert(*manager_id);
                set.insert(actor);
            }
            TaskEvent::Assigned { assignee_id, .. } => {
                set.insert(*assignee_id);
                set.insert(actor);
            }
            TaskEvent::Updated {
                manager_id,
                assignee_id,
                ..
            }
            | TaskEvent::StatusChanged {
                manager_id,
                assignee_id,
                ..
            }
            | TaskEvent::Deleted {
                manager_id,
                assignee_id,
                ..
            } => {
                set.insert(*manager_id);
                set.extend(*assignee_id);
                set.remove(&actor);
            }
            TaskEvent::LogAdded { manager_id, .. } => {
                set.insert(*manager_id);
                set.remove(&actor);
            }
        },
        EventPayload::Project(e) => match e {
            ProjectEvent::Created {
                manager_id,
                member_ids,
                ..
            } => {
                if *manager_id != actor {
                    set.insert(*manager_id);
                }
                set.extend(member_ids.iter().copied());
            }
            ProjectEvent::Updated {
                manager_id,
                member_ids,
                ..
            }
            | ProjectEvent::Deleted {
                manager_id,
                member_ids,
                ..
            }
            | ProjectEvent::MemberAdded {
                manager_id,
                member_ids,
                ..
            } => {
                set.insert(*manager_id);
                set.extend(member_ids.iter().copied());
                set.remove(&actor);
            }
            ProjectEvent::MemberRemoved {
                manager_id,
                member_ids,
                member_id,
                ..
            } => {
                set.insert(*manager_id);
                set.extend(member_ids.iter().copied());
                set.insert(*member_id);
                set.remove(&actor);
            }
        },
        EventPayload::User(_) => {}
    }
    set
}

/// Full recipient set: direct recipients plus every active admin.
pub fn recipients_for(event: &DomainEvent, admin_ids: &[Uuid]) -> BTreeSet<Uuid> {
    let mut set = direct_recipients(event);
    set.extend(admin_ids.iter().copied());
    set
}

/// One notification per recipient of the event.
pub fn build_notifications(event: &DomainEvent, admin_ids: &[Uuid]) -> Vec<Notification> {
    let kind = kind_of(event);
    let message = message_for(event);
    recipients_for(event, admin_ids)
        .into_iter()
        .map(|recipient| {
            Notification::new(recipient, kind, message.clone(), event.timestamp)
                .with_refs(event.project_id(), event.task_id())
        })
        .collect()
}

/// Turns committed-to-be events into notifications inside a unit of work.
#[derive(Debug, Clone)]
pub struct FanoutEngine {
    store: Arc<StoreManager>,
}

impl FanoutEngine {
    /// Creates a new fanout engine.
    pub fn new(store: Arc<StoreManager>) -> Self {
        Self { store }
    }

    /// Append notifications for every event to the unit. Returns how many
    /// were queued.
    pub async fn deliver(&self, unit: &mut UnitOfWork, events: &[DomainEvent]) -> AppResult<usize> {
        if events.is_empty() {
            return Ok(0);
        }
        let admin_ids = self.store.active_admin_ids().await?;
        let before = unit.notifications.len();
        for event in events {
            let notifications = build_notifications(event, &admin_ids);
            debug!(
                event_id = %event.id,
                kind = %kind_of(event),
                recipients = notifications.len(),
                "Fanned out event"
            );
            unit.notify(notifications);
        }
        Ok(unit.notifications.len() - before)
    }
}
