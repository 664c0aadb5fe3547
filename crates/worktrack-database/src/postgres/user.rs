//! User repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_entity::user::{User, UserRole};

use super::write_err;

/// Repository for user rows.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user", e))
    }

    /// Find a user by login name.
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by username", e)
            })
    }

    /// List all users.
    pub async fn list(&self) -> AppResult<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list users", e))
    }

    /// IDs of active admins.
    pub async fn active_admin_ids(&self) -> AppResult<Vec<Uuid>> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE role = $1 AND is_active = TRUE")
            .bind(UserRole::Admin)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list admins", e))
    }

    /// Insert a user.
    pub async fn insert(conn: &mut PgConnection, user: &User) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, display_name, role, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to create user"))?;
        Ok(())
    }

    /// Replace a user's mutable fields.
    pub async fn update(conn: &mut PgConnection, user: &User) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, password_hash = $3, display_name = $4, role = $5, \
             is_active = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.display_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to update user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }
}
