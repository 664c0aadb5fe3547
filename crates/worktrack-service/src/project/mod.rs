//! Project management and membership.

pub mod members;
pub mod service;

pub use service::{CreateProjectRequest, ProjectService, UpdateProjectRequest};
