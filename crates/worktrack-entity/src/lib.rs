//! # worktrack-entity
//!
//! Domain entity models for WorkTrack. Every struct in this crate
//! represents a database table row or a domain value object. Row types
//! derive `sqlx::FromRow` and serialize with camelCase field names.

pub mod audit;
pub mod notification;
pub mod permission;
pub mod project;
pub mod task;
pub mod user;
