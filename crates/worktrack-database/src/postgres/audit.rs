//! Audit log repository.

use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use worktrack_core::error::{AppError, ErrorKind};
use worktrack_core::result::AppResult;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_entity::audit::{AuditEntry, AuditFilter, NewAuditEntry};

use super::write_err;

/// Repository for the append-only audit log.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &AuditFilter) {
    if !filter.actions.is_empty() {
        let actions: Vec<String> = filter.actions.iter().map(|a| a.as_str().to_string()).collect();
        qb.push(" AND action = ANY(").push_bind(actions).push(")");
    }
    if let Some(performed_by) = filter.performed_by {
        qb.push(" AND performed_by = ").push_bind(performed_by);
    }
    if let Some(project_id) = filter.project_id {
        qb.push(" AND project_id = ").push_bind(project_id);
    }
    if let Some(task_id) = filter.task_id {
        qb.push(" AND task_id = ").push_bind(task_id);
    }
}

impl AuditRepository {
    /// Create a new audit repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Search audit entries, newest first.
    pub async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditEntry>> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_log WHERE TRUE");
        push_filters(&mut count, filter);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count audit entries", e))?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM audit_log WHERE TRUE");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, seq DESC LIMIT ")
            .push_bind(page.limit() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let items = select
            .build_query_as::<AuditEntry>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to search audit log", e))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    /// Append an entry; `seq` comes from the table sequence.
    pub async fn insert(conn: &mut PgConnection, entry: &NewAuditEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_log (id, action, performed_by, project_id, task_id, affected_user_id, details, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(Uuid::new_v4())
        .bind(entry.action.as_str())
        .bind(entry.performed_by)
        .bind(entry.project_id)
        .bind(entry.task_id)
        .bind(entry.affected_user_id)
        .bind(&entry.details)
        .bind(entry.created_at)
        .execute(&mut *conn)
        .await
        .map_err(write_err("Failed to write audit entry"))?;
        Ok(())
    }
}
