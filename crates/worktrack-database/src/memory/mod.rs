//! Process-local store backend.

mod store;

pub use store::MemoryStore;
