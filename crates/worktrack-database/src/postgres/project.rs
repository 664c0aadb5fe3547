//! Project repository.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_entity::project::Project;

use super::{expect_one_row, write_err};
use crate::store::ProjectScope;

/// Repository for project rows.
#[derive(Debug, Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    /// Create a new project repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a project by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Project>> {
        sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find project", e))
    }

    /// List projects in scope.
    pub async fn list(&self, scope: ProjectScope) -> AppResult<Vec<Project>> {
        let query = match scope {
            ProjectScope::All => {
                sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            }
            ProjectScope::Involving(user_id) => sqlx::query_as::<_, Project>(
                "SELECT * FROM projects WHERE manager_id = $1 OR $1 = ANY(members) \
                 ORDER BY created_at DESC",
            )
            .bind(user_id),
        };
        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list projects", e))
    }

    /// Insert a project.
    pub async fn insert(conn: &mut PgConnection, project: &Project) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO projects (id, name, description, manager_id, members, status, version, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.manager_id)
        .bind(&project.members)
        .bind(project.status)
        .bind(project.version)
        .bind(project.created_by)
        .bind(project.created_at)
        .bind(project.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to create project"))?;
        Ok(())
    }

    /// Replace a project if its version still matches.
    pub async fn update(
        conn: &mut PgConnection,
        project: &Project,
        expected_version: i64,
    ) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE projects SET name = $2, description = $3, manager_id = $4, members = $5, \
             status = $6, version = $7, updated_at = $8 WHERE id = $1 AND version = $9",
        )
        .bind(project.id)
        .bind(&project.name)
        .bind(&project.description)
        .bind(project.manager_id)
        .bind(&project.members)
        .bind(project.status)
        .bind(project.version)
        .bind(project.updated_at)
        .bind(expected_version)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to update project"))?;
        expect_one_row(result.rows_affected(), "Project")
    }

    /// Delete a project; tasks and logs go with it through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid, expected_version: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(expected_version)
            .execute(&mut *conn)
            .await
            .map_err(write_err("Failed to delete project"))?;
        expect_one_row(result.rows_affected(), "Project")
    }
}
