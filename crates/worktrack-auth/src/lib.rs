//! # worktrack-auth
//!
//! Authorization and authentication building blocks for WorkTrack.
//!
//! ## Modules
//!
//! - `access` — the access evaluator: role and relationship based decisions
//!   on projects, tasks and user administration
//! - `jwt` — access token issuance and validation
//! - `password` — Argon2id password hashing

pub mod access;
pub mod jwt;
pub mod password;

pub use access::{AccessEvaluator, Decision, DenyReason, ProjectRelation};
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
