//! Project membership changes.

use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use worktrack_core::error::AppError;
use worktrack_core::events::{DomainEvent, ProjectEvent};
use worktrack_database::{Change, Store, UnitOfWork};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::permission::ProjectAction;
use worktrack_entity::project::Project;

use super::service::ProjectService;
use crate::context::RequestContext;

impl ProjectService {
    /// Adds a member to a project.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Project, AppError> {
        let current = self.load(project_id).await?;
        self.access
            .require_project(&ctx.principal, &current, ProjectAction::ManageMembers)?;

        if current.is_manager(user_id) {
            return Err(AppError::invalid_field(
                "userId",
                "The project manager cannot be a member",
            ));
        }
        self.check_member_candidate(user_id, "userId").await?;
        if current.is_member(user_id) {
            return Err(AppError::conflict("User is already a member of this project"));
        }

        let now = Utc::now();
        let mut updated = current.clone();
        updated.members.push(user_id);
        updated.version = current.version + 1;
        updated.updated_at = now;

        let event = ProjectEvent::MemberAdded {
            project_id: updated.id,
            name: updated.name.clone(),
            manager_id: updated.manager_id,
            member_ids: updated.members.clone(),
            member_id: user_id,
        };
        self.commit_membership(ctx, &current, &updated, AuditAction::ProjectMemberAdded, user_id, event)
            .await?;
        Ok(updated)
    }

    /// Removes a member from a project.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Project, AppError> {
        let current = self.load(project_id).await?;
        self.access
            .require_project(&ctx.principal, &current, ProjectAction::ManageMembers)?;

        if !current.is_member(user_id) {
            return Err(AppError::not_found("Member not found"));
        }

        let now = Utc::now();
        let mut updated = current.clone();
        updated.members.retain(|m| *m != user_id);
        updated.version = current.version + 1;
        updated.updated_at = now;

        let event = ProjectEvent::MemberRemoved {
            project_id: updated.id,
            name: updated.name.clone(),
            manager_id: updated.manager_id,
            member_ids: updated.members.clone(),
            member_id: user_id,
        };
        self.commit_membership(ctx, &current, &updated, AuditAction::ProjectMemberRemoved, user_id, event)
            .await?;
        Ok(updated)
    }

    async fn commit_membership(
        &self,
        ctx: &RequestContext,
        current: &Project,
        updated: &Project,
        action: AuditAction,
        member_id: Uuid,
        event: ProjectEvent,
    ) -> Result<(), AppError> {
        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateProject {
            project: updated.clone(),
            expected_version: current.version,
        })
        .audit(
            NewAuditEntry::new(action, ctx.user_id())
                .project(updated.id)
                .affected_user(member_id)
                .details(json!({ "memberCount": updated.members.len() }))
                .at(updated.updated_at),
        );
        let event = DomainEvent::at(ctx.user_id(), event.into(), updated.updated_at);
        let recipients = self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            actor = %ctx.user_id(),
            project_id = %updated.id,
            member_id = %member_id,
            %action,
            recipients,
            "Project membership changed"
        );
        Ok(())
    }
}
