//! Task domain entities.

pub mod log;
pub mod model;
pub mod priority;
pub mod status;

pub use log::TaskLogEntry;
pub use model::Task;
pub use priority::TaskPriority;
pub use status::TaskStatus;
