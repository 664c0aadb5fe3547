//! Audit log queries.
//!
//! Entries are written only through units of work; this service reads.

use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use worktrack_auth::access::DenyReason;
use worktrack_core::error::AppError;
use worktrack_core::types::pagination::{PageRequest, PageResponse};
use worktrack_database::{Store, StoreManager};
use worktrack_entity::audit::{AuditAction, AuditEntry, AuditFilter};

use crate::context::RequestContext;

/// Optional criteria for the admin audit search.
#[derive(Debug, Clone, Default)]
pub struct AuditSearch {
    /// Restrict to one action.
    pub action: Option<AuditAction>,
    /// Restrict to one performer.
    pub performed_by: Option<Uuid>,
    /// Restrict to one project.
    pub project_id: Option<Uuid>,
    /// Restrict to one task.
    pub task_id: Option<Uuid>,
}

/// Service for browsing the audit log.
#[derive(Debug, Clone)]
pub struct AuditService {
    store: Arc<StoreManager>,
}

impl AuditService {
    /// Creates a new audit service.
    pub fn new(store: Arc<StoreManager>) -> Self {
        Self { store }
    }

    /// Login history: the caller's own for non-admins, everyone's for admins.
    pub async fn activity_logs(
        &self,
        ctx: &RequestContext,
        page: PageRequest,
    ) -> Result<PageResponse<AuditEntry>, AppError> {
        let filter = AuditFilter {
            actions: vec![AuditAction::LoginSuccess, AuditAction::LoginFailed],
            performed_by: (!ctx.is_admin()).then(|| ctx.user_id()),
            ..AuditFilter::default()
        };
        self.store.search_audit(&filter, &page).await
    }

    /// Full audit search (admin only).
    pub async fn search(
        &self,
        ctx: &RequestContext,
        search: AuditSearch,
        page: PageRequest,
    ) -> Result<PageResponse<AuditEntry>, AppError> {
        if !ctx.is_admin() || !ctx.principal.active {
            warn!(user_id = %ctx.user_id(), "Audit search denied");
            return Err(AppError::forbidden(DenyReason::RoleNotPermitted.as_str()));
        }
        let filter = AuditFilter {
            actions: search.action.into_iter().collect(),
            performed_by: search.performed_by,
            project_id: search.project_id,
            task_id: search.task_id,
        };
        self.store.search_audit(&filter, &page).await
    }
}
