//! Audit log read access.

pub mod service;

pub use service::{AuditSearch, AuditService};
