//! Project CRUD.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use worktrack_auth::AccessEvaluator;
use worktrack_core::error::AppError;
use worktrack_core::events::{DomainEvent, ProjectEvent};
use worktrack_database::{Change, ProjectScope, Store, StoreManager, UnitOfWork};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::permission::ProjectAction;
use worktrack_entity::project::{Project, ProjectStatus};
use worktrack_entity::user::UserRole;

use crate::context::RequestContext;
use crate::notification::FanoutEngine;

/// Request to create a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Description.
    pub description: Option<String>,
    /// Owning manager; the caller when omitted.
    pub manager_id: Option<Uuid>,
    /// Initial members.
    #[serde(default)]
    pub members: Vec<Uuid>,
    /// Initial status.
    pub status: Option<ProjectStatus>,
}

/// Request to update a project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<ProjectStatus>,
}

/// Manages projects.
#[derive(Debug, Clone)]
pub struct ProjectService {
    pub(crate) store: Arc<StoreManager>,
    pub(crate) access: Arc<AccessEvaluator>,
    pub(crate) fanout: Arc<FanoutEngine>,
}

impl ProjectService {
    /// Creates a new project service.
    pub fn new(
        store: Arc<StoreManager>,
        access: Arc<AccessEvaluator>,
        fanout: Arc<FanoutEngine>,
    ) -> Self {
        Self {
            store,
            access,
            fanout,
        }
    }

    /// Lists the projects the caller can read.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<Project>, AppError> {
        let scope = if ctx.is_admin() {
            ProjectScope::All
        } else {
            ProjectScope::Involving(ctx.user_id())
        };
        let projects = self.store.list_projects(scope).await?;
        Ok(projects
            .into_iter()
            .filter(|p| {
                self.access
                    .project(&ctx.principal, p, ProjectAction::Read)
                    .is_allowed()
            })
            .collect())
    }

    /// Gets a single project.
    pub async fn get(&self, ctx: &RequestContext, project_id: Uuid) -> Result<Project, AppError> {
        let project = self.load(project_id).await?;
        self.access
            .require_project(&ctx.principal, &project, ProjectAction::Read)?;
        Ok(project)
    }

    /// Creates a project.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateProjectRequest,
    ) -> Result<Project, AppError> {
        let decision = self.access.create_project(&ctx.principal);
        if !decision.is_allowed() {
            warn!(user_id = %ctx.user_id(), role = %ctx.role(), "Project creation denied");
        }
        decision.into_result("Project")?;

        let name = require_name(&req.name)?;

        let manager_id = req.manager_id.unwrap_or(ctx.user_id());
        if manager_id != ctx.user_id() {
            let manager = self.store.find_user(manager_id).await?;
            if !manager.is_some_and(|u| u.is_active && u.role == UserRole::Manager) {
                return Err(AppError::invalid_field(
                    "managerId",
                    "Manager must be an active user with the manager role",
                ));
            }
        }

        let mut members: Vec<Uuid> = Vec::with_capacity(req.members.len());
        for id in req.members {
            if members.contains(&id) {
                continue;
            }
            if id == manager_id {
                return Err(AppError::invalid_field(
                    "members",
                    "The project manager cannot be a member",
                ));
            }
            self.check_member_candidate(id, "members").await?;
            members.push(id);
        }

        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name,
            description: req.description,
            manager_id,
            members,
            status: req.status.unwrap_or_default(),
            version: 1,
            created_by: ctx.user_id(),
            created_at: now,
            updated_at: now,
        };

        let mut unit = UnitOfWork::new();
        unit.change(Change::InsertProject(project.clone())).audit(
            NewAuditEntry::new(AuditAction::ProjectCreated, ctx.user_id())
                .project(project.id)
                .details(json!({
                    "name": project.name,
                    "managerId": project.manager_id,
                    "members": project.members,
                }))
                .at(now),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            ProjectEvent::Created {
                project_id: project.id,
                name: project.name.clone(),
                manager_id: project.manager_id,
                member_ids: project.members.clone(),
            }
            .into(),
            now,
        );
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            project_id = %project.id,
            recipients,
            "Project created"
        );
        Ok(project)
    }

    /// Updates name, description or status.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        req: UpdateProjectRequest,
    ) -> Result<Project, AppError> {
        let current = self.load(project_id).await?;
        self.access
            .require_project(&ctx.principal, &current, ProjectAction::Update)?;

        let mut updated = current.clone();
        let mut changed = Vec::new();
        if let Some(ref name) = req.name {
            let name = require_name(name)?;
            if name != current.name {
                updated.name = name;
                changed.push("name");
            }
        }
        if req.description.is_some() && req.description != current.description {
            updated.description = req.description;
            changed.push("description");
        }
        if let Some(status) = req.status
            && status != current.status
        {
            updated.status = status;
            changed.push("status");
        }

        let now = Utc::now();
        updated.version = current.version + 1;
        updated.updated_at = now;

        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateProject {
            project: updated.clone(),
            expected_version: current.version,
        })
        .audit(
            NewAuditEntry::new(AuditAction::ProjectUpdated, ctx.user_id())
                .project(updated.id)
                .details(json!({ "changedFields": changed }))
                .at(now),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            ProjectEvent::Updated {
                project_id: updated.id,
                name: updated.name.clone(),
                manager_id: updated.manager_id,
                member_ids: updated.members.clone(),
            }
            .into(),
            now,
        );
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            project_id = %updated.id,
            recipients,
            "Project updated"
        );
        Ok(updated)
    }

    /// Deletes a project together with its tasks and their logs.
    ///
    /// Audit entries and notifications referring to it are kept.
    pub async fn delete(&self, ctx: &RequestContext, project_id: Uuid) -> Result<Project, AppError> {
        let project = self.load(project_id).await?;
        self.access
            .require_project(&ctx.principal, &project, ProjectAction::Delete)?;

        let now = Utc::now();
        let mut unit = UnitOfWork::new();
        unit.change(Change::DeleteProject {
            id: project.id,
            expected_version: project.version,
        })
        .audit(
            NewAuditEntry::new(AuditAction::ProjectDeleted, ctx.user_id())
                .project(project.id)
                .details(json!({ "name": project.name }))
                .at(now),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            ProjectEvent::Deleted {
                project_id: project.id,
                name: project.name.clone(),
                manager_id: project.manager_id,
                member_ids: project.members.clone(),
            }
            .into(),
            now,
        );
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            project_id = %project.id,
            recipients,
            "Project deleted"
        );
        Ok(project)
    }

    pub(crate) async fn load(&self, project_id: Uuid) -> Result<Project, AppError> {
        self.store
            .find_project(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))
    }

    /// A member must be an existing, active, non-admin user.
    pub(crate) async fn check_member_candidate(
        &self,
        user_id: Uuid,
        field: &str,
    ) -> Result<(), AppError> {
        match self.store.find_user(user_id).await? {
            None => Err(AppError::invalid_field(field, "User does not exist")),
            Some(u) if !u.is_active => Err(AppError::invalid_field(field, "User is inactive")),
            Some(u) if u.is_admin() => Err(AppError::invalid_field(
                field,
                "Admins cannot be project members",
            )),
            Some(_) => Ok(()),
        }
    }
}

fn require_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::invalid_field("name", "Project name is required"));
    }
    Ok(name.to_string())
}
