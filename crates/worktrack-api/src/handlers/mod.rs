//! HTTP request handlers, one module per resource.

pub mod activity;
pub mod auth;
pub mod health;
pub mod notifications;
pub mod projects;
pub mod task_logs;
pub mod tasks;
pub mod users;
