//! Project domain entities.

pub mod model;
pub mod status;

pub use model::Project;
pub use status::ProjectStatus;
