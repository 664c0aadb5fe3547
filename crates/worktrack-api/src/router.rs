//! Route definitions for the WorkTrack HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` router without outer middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(project_routes())
        .merge(task_routes())
        .merge(activity_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Auth endpoints: login, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// User administration (admin only)
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
}

/// Projects and membership
fn project_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(handlers::projects::list_projects).post(handlers::projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::projects::get_project)
                .put(handlers::projects::update_project)
                .delete(handlers::projects::delete_project),
        )
        .route(
            "/projects/{id}/add-member",
            post(handlers::projects::add_member),
        )
        .route(
            "/projects/{id}/remove-member/{user_id}",
            delete(handlers::projects::remove_member),
        )
}

/// Tasks and their progress logs
fn task_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/tasks",
            get(handlers::tasks::list_tasks).post(handlers::tasks::create_task),
        )
        .route(
            "/tasks/{id}",
            get(handlers::tasks::get_task)
                .put(handlers::tasks::update_task)
                .delete(handlers::tasks::delete_task),
        )
        .route("/tasks/{id}/status", patch(handlers::tasks::update_status))
        .route("/tasks/{id}/assign", patch(handlers::tasks::assign_task))
        .route(
            "/tasks/{id}/logs",
            get(handlers::task_logs::list_logs).post(handlers::task_logs::append_log),
        )
}

/// Audit views
fn activity_routes() -> Router<AppState> {
    Router::new()
        .route("/activity-logs", get(handlers::activity::activity_logs))
        .route("/admin/audit", get(handlers::activity::search_audit))
}

/// Notification inbox
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notifications::unread_count),
        )
        .route(
            "/notifications/mark-all-read",
            patch(handlers::notifications::mark_all_read),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notifications::mark_read),
        )
}

/// Health
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
