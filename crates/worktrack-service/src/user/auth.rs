//! Login and identity.

use std::sync::Arc;

use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};

use worktrack_auth::{IssuedToken, JwtEncoder, PasswordHasher};
use worktrack_core::error::AppError;
use worktrack_database::{Store, StoreManager, UnitOfWork};
use worktrack_entity::audit::{AuditAction, NewAuditEntry};
use worktrack_entity::user::User;

use crate::context::RequestContext;

/// A successful login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    /// The issued access token.
    #[serde(flatten)]
    pub token: IssuedToken,
    /// The authenticated user.
    pub user: User,
}

/// Verifies credentials and issues access tokens.
#[derive(Debug, Clone)]
pub struct AuthService {
    store: Arc<StoreManager>,
    hasher: Arc<PasswordHasher>,
    encoder: Arc<JwtEncoder>,
}

impl AuthService {
    /// Creates a new auth service.
    pub fn new(store: Arc<StoreManager>, hasher: Arc<PasswordHasher>, encoder: Arc<JwtEncoder>) -> Self {
        Self {
            store,
            hasher,
            encoder,
        }
    }

    /// Authenticates a user by username and password.
    ///
    /// Failures against a known username are audited as `LOGIN_FAILED`
    /// for that user. Every failure yields the same error.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: &str,
    ) -> Result<LoginResult, AppError> {
        let invalid = || AppError::unauthorized("Invalid username or password");

        let Some(user) = self.store.find_user_by_username(username.trim()).await? else {
            self.hasher.verify_absent(password)?;
            warn!(username = %username, ip = %ip_address, "Login attempt for unknown user");
            return Err(invalid());
        };

        let password_ok = self.hasher.verify_password(password, &user.password_hash)?;
        if !password_ok || !user.is_active {
            let reason = if password_ok { "inactive" } else { "bad_password" };
            let mut unit = UnitOfWork::new();
            unit.audit(
                NewAuditEntry::new(AuditAction::LoginFailed, user.id)
                    .affected_user(user.id)
                    .details(json!({ "ip": ip_address, "reason": reason })),
            );
            self.store.commit(unit).await?;
            warn!(user_id = %user.id, ip = %ip_address, reason, "Login failed");
            return Err(invalid());
        }

        let token = self.encoder.issue(&user)?;
        let mut unit = UnitOfWork::new();
        unit.audit(
            NewAuditEntry::new(AuditAction::LoginSuccess, user.id)
                .affected_user(user.id)
                .details(json!({ "ip": ip_address })),
        );
        self.store.commit(unit).await?;

        info!(user_id = %user.id, username = %user.username, "User logged in");
        Ok(LoginResult { token, user })
    }

    /// The caller's stored profile.
    pub async fn me(&self, ctx: &RequestContext) -> Result<User, AppError> {
        self.store
            .find_user(ctx.user_id())
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))
    }
}
