//! The access evaluator.
//!
//! Pure functions of the principal, the resource's current relationship
//! state and the requested action. Nothing here touches the store; callers
//! load the project and task in the same request and pass them in.

use tracing::warn;
use uuid::Uuid;

use worktrack_core::error::AppError;
use worktrack_entity::permission::{ProjectAction, TaskAction, UserAction};
use worktrack_entity::project::Project;
use worktrack_entity::user::{Principal, UserRole};

use super::decision::{Decision, DenyReason};
use super::relation::ProjectRelation;

/// Decides what a principal may see and do.
#[derive(Debug, Clone, Default)]
pub struct AccessEvaluator;

impl AccessEvaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Decide a project action.
    pub fn project(&self, principal: &Principal, project: &Project, action: ProjectAction) -> Decision {
        if !principal.active {
            return Decision::Hidden;
        }
        if action == ProjectAction::Create {
            return self.create_project(principal);
        }
        let relation = ProjectRelation::of(project, principal.id);
        match principal.role {
            UserRole::Admin => {
                if action.is_mutation() {
                    Decision::Deny(DenyReason::AdminReadOnly)
                } else {
                    Decision::Allow
                }
            }
            UserRole::Manager => match (relation, action) {
                (ProjectRelation::Owner, _) => Decision::Allow,
                (ProjectRelation::Member, ProjectAction::Read) => Decision::Allow,
                (ProjectRelation::Member, _) => Decision::Deny(DenyReason::NotProjectManager),
                (ProjectRelation::None, _) => Decision::Hidden,
            },
            UserRole::Member => match (relation, action) {
                (ProjectRelation::None, _) => Decision::Hidden,
                (_, ProjectAction::Read) => Decision::Allow,
                (_, _) => Decision::Deny(DenyReason::RoleNotPermitted),
            },
        }
    }

    /// Decide whether the principal may create a project.
    pub fn create_project(&self, principal: &Principal) -> Decision {
        if !principal.active {
            return Decision::Hidden;
        }
        match principal.role {
            UserRole::Admin => Decision::Deny(DenyReason::AdminReadOnly),
            UserRole::Manager => Decision::Allow,
            UserRole::Member => Decision::Deny(DenyReason::RoleNotPermitted),
        }
    }

    /// Decide a task action. `assignee` is the task's current assignee;
    /// for [`TaskAction::Create`] pass `None`.
    pub fn task(
        &self,
        principal: &Principal,
        project: &Project,
        assignee: Option<Uuid>,
        action: TaskAction,
    ) -> Decision {
        if !principal.active {
            return Decision::Hidden;
        }
        let is_assignee = assignee == Some(principal.id);
        if action == TaskAction::AppendLog && is_assignee {
            return Decision::Allow;
        }

        let relation = ProjectRelation::of(project, principal.id);
        let related = relation.is_related() || is_assignee;

        match principal.role {
            UserRole::Admin => {
                if action.is_read() {
                    Decision::Allow
                } else {
                    Decision::Deny(DenyReason::AdminReadOnly)
                }
            }
            UserRole::Manager => match action {
                TaskAction::Read | TaskAction::ReadLog => {
                    if related {
                        Decision::Allow
                    } else {
                        Decision::Hidden
                    }
                }
                TaskAction::AppendLog => hide_unless(related, DenyReason::NotAssignee),
                TaskAction::Create
                | TaskAction::Update
                | TaskAction::Delete
                | TaskAction::Assign
                | TaskAction::UpdateStatus => {
                    if relation == ProjectRelation::Owner {
                        Decision::Allow
                    } else {
                        hide_unless(related, DenyReason::NotProjectManager)
                    }
                }
            },
            UserRole::Member => match action {
                TaskAction::Read | TaskAction::ReadLog | TaskAction::UpdateStatus => {
                    if is_assignee {
                        Decision::Allow
                    } else {
                        hide_unless(related, DenyReason::NotAssignee)
                    }
                }
                TaskAction::AppendLog => hide_unless(related, DenyReason::NotAssignee),
                TaskAction::Create | TaskAction::Update | TaskAction::Delete | TaskAction::Assign => {
                    hide_unless(related, DenyReason::RoleNotPermitted)
                }
            },
        }
    }

    /// Decide a user administration action.
    pub fn user(&self, principal: &Principal, _action: UserAction) -> Decision {
        if !principal.active {
            return Decision::Hidden;
        }
        match principal.role {
            UserRole::Admin => Decision::Allow,
            UserRole::Manager | UserRole::Member => Decision::Deny(DenyReason::RoleNotPermitted),
        }
    }

    /// Require a project action, mapping refusals to errors.
    pub fn require_project(
        &self,
        principal: &Principal,
        project: &Project,
        action: ProjectAction,
    ) -> Result<(), AppError> {
        let decision = self.project(principal, project, action);
        log_refusal(principal, "project", project.id, &action, decision);
        decision.into_result("Project")
    }

    /// Require a task action, mapping refusals to errors.
    pub fn require_task(
        &self,
        principal: &Principal,
        project: &Project,
        task_id: Option<Uuid>,
        assignee: Option<Uuid>,
        action: TaskAction,
    ) -> Result<(), AppError> {
        let decision = self.task(principal, project, assignee, action);
        log_refusal(principal, "task", task_id.unwrap_or(project.id), &action, decision);
        decision.into_result(if task_id.is_some() { "Task" } else { "Project" })
    }

    /// Require a user administration action.
    pub fn require_user(&self, principal: &Principal, action: UserAction) -> Result<(), AppError> {
        let decision = self.user(principal, action);
        if !decision.is_allowed() {
            warn!(principal = %principal.id, role = %principal.role, ?action, "User administration denied");
        }
        decision.into_result("User")
    }
}

fn hide_unless(related: bool, reason: DenyReason) -> Decision {
    if related {
        Decision::Deny(reason)
    } else {
        Decision::Hidden
    }
}

fn log_refusal(
    principal: &Principal,
    resource: &str,
    resource_id: Uuid,
    action: &dyn std::fmt::Debug,
    decision: Decision,
) {
    match decision {
        Decision::Allow => {}
        Decision::Deny(reason) => warn!(
            principal = %principal.id,
            role = %principal.role,
            resource,
            %resource_id,
            ?action,
            %reason,
            "Access denied"
        ),
        Decision::Hidden => warn!(
            principal = %principal.id,
            role = %principal.role,
            resource,
            %resource_id,
            ?action,
            "Access hidden"
        ),
    }
}
