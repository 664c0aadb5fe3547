//! Core type definitions used across the WorkTrack workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
