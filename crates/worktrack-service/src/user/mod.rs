//! User administration and authentication.

pub mod admin;
pub mod auth;

pub use admin::{AdminUserService, CreateUserRequest, UpdateUserRequest};
pub use auth::{AuthService, LoginResult};
