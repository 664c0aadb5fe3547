//! Admin user management: create, update, deactivate.
//!
//! Users are never hard-deleted; deleting deactivates so that audit
//! history and project ownership keep pointing at a real row.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use worktrack_auth::{AccessEvaluator, PasswordHasher};
use worktrack_core::config::AuthConfig;
use worktrack_core::error::AppError;
use worktrack_core::events::{DomainEvent, UserEvent};
use worktrack_database::{Change, Store, StoreManager, UnitOfWork};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::permission::UserAction;
use worktrack_entity::user::{User, UserRole};

use crate::context::RequestContext;
use crate::notification::FanoutEngine;

/// Request to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    /// Username (unique).
    pub username: String,
    /// Initial password.
    pub password: String,
    /// Email (optional).
    pub email: Option<String>,
    /// Display name.
    pub display_name: Option<String>,
    /// Role assignment.
    pub role: UserRole,
}

/// Request to update a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// Activate or deactivate.
    pub is_active: Option<bool>,
}

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    store: Arc<StoreManager>,
    access: Arc<AccessEvaluator>,
    hasher: Arc<PasswordHasher>,
    fanout: Arc<FanoutEngine>,
    password_min_length: usize,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        store: Arc<StoreManager>,
        access: Arc<AccessEvaluator>,
        hasher: Arc<PasswordHasher>,
        fanout: Arc<FanoutEngine>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            access,
            hasher,
            fanout,
            password_min_length: config.password_min_length,
        }
    }

    /// Lists all users, oldest first.
    pub async fn list(&self, ctx: &RequestContext) -> Result<Vec<User>, AppError> {
        self.access.require_user(&ctx.principal, UserAction::Read)?;
        self.store.list_users().await
    }

    /// Gets a single user by ID.
    pub async fn get(&self, ctx: &RequestContext, user_id: Uuid) -> Result<User, AppError> {
        self.access.require_user(&ctx.principal, UserAction::Read)?;
        self.load(user_id).await
    }

    /// Creates a new user.
    pub async fn create(&self, ctx: &RequestContext, req: CreateUserRequest) -> Result<User, AppError> {
        self.access.require_user(&ctx.principal, UserAction::Create)?;

        let username = req.username.trim();
        if username.chars().count() < 3 {
            return Err(AppError::invalid_field(
                "username",
                "Username must be at least 3 characters",
            ));
        }
        if req.password.chars().count() < self.password_min_length {
            return Err(AppError::invalid_field(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.password_min_length
                ),
            ));
        }
        if self.store.find_user_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }

        let mut user = User::new(username, self.hasher.hash_password(&req.password)?, req.role);
        user.email = req.email;
        user.display_name = req.display_name;

        let mut unit = UnitOfWork::new();
        unit.change(Change::InsertUser(user.clone())).audit(
            NewAuditEntry::new(AuditAction::UserCreated, ctx.user_id())
                .affected_user(user.id)
                .details(json!({ "username": user.username, "role": user.role }))
                .at(user.created_at),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            UserEvent::Created {
                user_id: user.id,
                username: user.username.clone(),
                role: user.role.to_string(),
            }
            .into(),
            user.created_at,
        );
        self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(
            admin_id = %ctx.user_id(),
            new_user_id = %user.id,
            username = %user.username,
            role = %user.role,
            "User created by admin"
        );
        Ok(user)
    }

    /// Updates profile fields, role or active flag.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        req: UpdateUserRequest,
    ) -> Result<User, AppError> {
        self.access.require_user(&ctx.principal, UserAction::Update)?;
        let mut user = self.load(user_id).await?;

        if user_id == ctx.user_id() {
            if req.is_active == Some(false) {
                return Err(AppError::invalid_field(
                    "isActive",
                    "Admins cannot deactivate themselves",
                ));
            }
            if req.role.is_some_and(|r| r != user.role) {
                return Err(AppError::invalid_field(
                    "role",
                    "Admins cannot change their own role",
                ));
            }
        }

        let mut changed = Vec::new();
        if req.display_name.is_some() && req.display_name != user.display_name {
            user.display_name = req.display_name;
            changed.push("displayName".to_string());
        }
        if req.email.is_some() && req.email != user.email {
            user.email = req.email;
            changed.push("email".to_string());
        }
        if let Some(role) = req.role
            && role != user.role
        {
            user.role = role;
            changed.push("role".to_string());
        }
        if let Some(active) = req.is_active
            && active != user.is_active
        {
            user.is_active = active;
            changed.push("isActive".to_string());
        }
        if changed.is_empty() {
            return Ok(user);
        }
        user.updated_at = Utc::now();

        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateUser(user.clone())).audit(
            NewAuditEntry::new(AuditAction::UserUpdated, ctx.user_id())
                .affected_user(user.id)
                .details(json!({ "changedFields": changed }))
                .at(user.updated_at),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            UserEvent::Updated {
                user_id: user.id,
                username: user.username.clone(),
                changed_fields: changed,
            }
            .into(),
            user.updated_at,
        );
        self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(admin_id = %ctx.user_id(), target_id = %user_id, "User updated by admin");
        Ok(user)
    }

    /// Deactivates a user.
    pub async fn deactivate(&self, ctx: &RequestContext, user_id: Uuid) -> Result<User, AppError> {
        self.access.require_user(&ctx.principal, UserAction::Delete)?;
        if user_id == ctx.user_id() {
            return Err(AppError::validation("Admins cannot deactivate themselves"));
        }
        let mut user = self.load(user_id).await?;
        if !user.is_active {
            return Ok(user);
        }
        user.is_active = false;
        user.updated_at = Utc::now();

        let mut unit = UnitOfWork::new();
        unit.change(Change::UpdateUser(user.clone())).audit(
            NewAuditEntry::new(AuditAction::UserDeleted, ctx.user_id())
                .affected_user(user.id)
                .details(json!({ "username": user.username }))
                .at(user.updated_at),
        );
        let event = DomainEvent::at(
            ctx.user_id(),
            UserEvent::Deleted {
                user_id: user.id,
                username: user.username.clone(),
            }
            .into(),
            user.updated_at,
        );
        self.fanout.deliver(&mut unit, &[event]).await?;
        self.store.commit(unit).await?;

        info!(admin_id = %ctx.user_id(), target_id = %user_id, "User deactivated");
        Ok(user)
    }

    /// Seed the configured admin account when no active admin exists.
    pub async fn ensure_bootstrap_admin(&self, config: &AuthConfig) -> Result<Option<User>, AppError> {
        let Some(ref bootstrap) = config.bootstrap_admin else {
            return Ok(None);
        };
        if !self.store.active_admin_ids().await?.is_empty() {
            return Ok(None);
        }
        if self
            .store
            .find_user_by_username(&bootstrap.username)
            .await?
            .is_some()
        {
            warn!(
                username = %bootstrap.username,
                "No active admin, but the bootstrap username is taken"
            );
            return Ok(None);
        }

        let user = User::new(
            bootstrap.username.clone(),
            self.hasher.hash_password(&bootstrap.password)?,
            UserRole::Admin,
        );
        let mut unit = UnitOfWork::new();
        unit.change(Change::InsertUser(user.clone())).audit(
            NewAuditEntry::new(AuditAction::UserCreated, user.id)
                .affected_user(user.id)
                .details(json!({ "username": user.username, "role": user.role, "bootstrap": true }))
                .at(user.created_at),
        );
        self.store.commit(unit).await?;

        warn!(username = %user.username, "Created bootstrap admin account; change its password");
        Ok(Some(user))
    }

    async fn load(&self, user_id: Uuid) -> Result<User, AppError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
