//! # worktrack-service
//!
//! Business logic for WorkTrack. Every mutating operation follows the same
//! shape: load the current state, ask the [`AccessEvaluator`] for a
//! decision, validate input, then commit the change together with its
//! audit entries and notifications as one unit of work.
//!
//! Services follow constructor injection: all dependencies are provided at
//! construction time via `Arc` references.
//!
//! [`AccessEvaluator`]: worktrack_auth::AccessEvaluator

pub mod audit;
pub mod context;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

#[cfg(test)]
mod testing;

pub use audit::AuditService;
pub use context::RequestContext;
pub use notification::{DueSoonGenerator, FanoutEngine, NotificationService};
pub use project::ProjectService;
pub use task::{TaskLogService, TaskService};
pub use user::{AdminUserService, AuthService};
