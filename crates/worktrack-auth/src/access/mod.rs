//! Role and relationship based access decisions.

pub mod decision;
pub mod evaluator;
pub mod relation;

pub use decision::{Decision, DenyReason};
pub use evaluator::AccessEvaluator;
pub use relation::ProjectRelation;
