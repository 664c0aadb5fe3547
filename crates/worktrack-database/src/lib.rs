//! # worktrack-database
//!
//! Persistence for WorkTrack: the [`Store`] trait every service talks to,
//! the [`UnitOfWork`] write path, a PostgreSQL backend built on sqlx and a
//! process-local backend used by tests and `provider = "memory"` setups.

pub mod connection;
pub mod manager;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod store;
pub mod unit_of_work;

pub use connection::DatabasePool;
pub use manager::StoreManager;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{ProjectScope, Store, TaskQuery, TaskScope};
pub use unit_of_work::{Change, UnitOfWork};
