//! Actions checked by the access evaluator.

pub mod action;

pub use action::{ProjectAction, TaskAction, UserAction};
