//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use worktrack_auth::{AccessEvaluator, JwtDecoder, JwtEncoder, PasswordHasher};
use worktrack_core::config::AppConfig;
use worktrack_database::StoreManager;
use worktrack_service::{
    AdminUserService, AuditService, AuthService, DueSoonGenerator, FanoutEngine,
    NotificationService, ProjectService, TaskLogService, TaskService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Persistence backend
    pub store: Arc<StoreManager>,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token encoder
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,

    // ── Services ─────────────────────────────────────────────
    /// Login and identity
    pub auth_service: Arc<AuthService>,
    /// Admin user management
    pub admin_user_service: Arc<AdminUserService>,
    /// Projects and membership
    pub project_service: Arc<ProjectService>,
    /// Tasks
    pub task_service: Arc<TaskService>,
    /// Task progress logs
    pub task_log_service: Arc<TaskLogService>,
    /// Audit log reads
    pub audit_service: Arc<AuditService>,
    /// Notification inbox
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    /// Wire every service on top of `store`.
    pub fn new(config: AppConfig, store: Arc<StoreManager>) -> Self {
        let access = Arc::new(AccessEvaluator::new());
        let hasher = Arc::new(PasswordHasher::new());
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let fanout = Arc::new(FanoutEngine::new(Arc::clone(&store)));
        let due_soon = Arc::new(DueSoonGenerator::new(
            Arc::clone(&store),
            &config.notifications,
        ));

        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&store),
            Arc::clone(&hasher),
            Arc::clone(&jwt_encoder),
        ));
        let admin_user_service = Arc::new(AdminUserService::new(
            Arc::clone(&store),
            Arc::clone(&access),
            Arc::clone(&hasher),
            Arc::clone(&fanout),
            &config.auth,
        ));
        let project_service = Arc::new(ProjectService::new(
            Arc::clone(&store),
            Arc::clone(&access),
            Arc::clone(&fanout),
        ));
        let task_service = Arc::new(TaskService::new(
            Arc::clone(&store),
            Arc::clone(&access),
            Arc::clone(&fanout),
            due_soon,
        ));
        let task_log_service = Arc::new(TaskLogService::new(
            Arc::clone(&store),
            Arc::clone(&access),
            Arc::clone(&fanout),
        ));
        let audit_service = Arc::new(AuditService::new(Arc::clone(&store)));
        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&store),
            config.notifications.clone(),
        ));

        Self {
            config: Arc::new(config),
            store,
            jwt_encoder,
            jwt_decoder,
            auth_service,
            admin_user_service,
            project_service,
            task_service,
            task_log_service,
            audit_service,
            notification_service,
        }
    }
}
