//! Task and task-log repository.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_entity::task::{Task, TaskLogEntry};

use super::{expect_one_row, write_err};
use crate::store::{TaskQuery, TaskScope};

/// Repository for task rows and their progress chains.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a task by ID.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    /// List tasks matching the query.
    pub async fn list(&self, query: &TaskQuery) -> AppResult<Vec<Task>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM tasks WHERE TRUE");
        match &query.scope {
            TaskScope::All => {}
            TaskScope::ProjectsOrAssignee {
                project_ids,
                user_id,
            } => {
                qb.push(" AND (project_id = ANY(")
                    .push_bind(project_ids.clone())
                    .push(") OR assigned_to = ")
                    .push_bind(*user_id)
                    .push(")");
            }
            TaskScope::Assignee(user_id) => {
                qb.push(" AND assigned_to = ").push_bind(*user_id);
            }
        }
        if let Some(project_id) = query.project_id {
            qb.push(" AND project_id = ").push_bind(project_id);
        }
        if let Some(status) = query.status {
            qb.push(" AND status = ").push_bind(status);
        }
        qb.push(" ORDER BY created_at DESC");

        qb.build_query_as::<Task>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tasks", e))
    }

    /// The progress chain of a task, oldest first.
    pub async fn list_logs(&self, task_id: Uuid) -> AppResult<Vec<TaskLogEntry>> {
        sqlx::query_as::<_, TaskLogEntry>(
            "SELECT * FROM task_logs WHERE task_id = $1 ORDER BY created_at ASC, seq ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list task logs", e))
    }

    /// Insert a task.
    pub async fn insert(conn: &mut PgConnection, task: &Task) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO tasks (id, project_id, title, description, assigned_to, status, priority, deadline, \
             version, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(task.id)
        .bind(task.project_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.deadline)
        .bind(task.version)
        .bind(task.created_by)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to create task"))?;
        Ok(())
    }

    /// Replace a task if its version still matches.
    pub async fn update(conn: &mut PgConnection, task: &Task, expected_version: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE tasks SET title = $2, description = $3, assigned_to = $4, status = $5, priority = $6, \
             deadline = $7, version = $8, updated_at = $9 WHERE id = $1 AND version = $10",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.assigned_to)
        .bind(task.status)
        .bind(task.priority)
        .bind(task.deadline)
        .bind(task.version)
        .bind(task.updated_at)
        .bind(expected_version)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to update task"))?;
        expect_one_row(result.rows_affected(), "Task")
    }

    /// Delete a task; its log goes with it through `ON DELETE CASCADE`.
    pub async fn delete(conn: &mut PgConnection, id: Uuid, expected_version: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND version = $2")
            .bind(id)
            .bind(expected_version)
            .execute(&mut *conn)
            .await
            .map_err(write_err("Failed to delete task"))?;
        expect_one_row(result.rows_affected(), "Task")
    }

    /// Append one log entry; `seq` comes from the table sequence.
    pub async fn append_log(conn: &mut PgConnection, entry: &TaskLogEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO task_logs (id, task_id, author_id, content, progress_percent, status_at_entry, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.task_id)
        .bind(entry.author_id)
        .bind(&entry.content)
        .bind(entry.progress_percent)
        .bind(entry.status_at_entry)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to append task log"))?;
        Ok(())
    }
}
