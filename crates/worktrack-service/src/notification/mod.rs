//! Notification fanout, due-soon alerts and the inbox.

pub mod due_soon;
pub mod fanout;
pub mod service;

pub use due_soon::DueSoonGenerator;
pub use fanout::FanoutEngine;
pub use service::{InboxPage, NotificationService};
