//! Tasks and their progress log chain.

pub mod log;
pub mod service;

pub use log::{AppendLogRequest, TaskLogService};
pub use service::{CreateTaskRequest, TaskFilter, TaskService, UpdateTaskRequest};
