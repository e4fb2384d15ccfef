//! `db` crate: pure persistence layer.
//!
//! Provides the connection provider, typed row structs, the
//! [`EngineStore`] / [`CarStore`] capability traits and their Postgres and
//! in-memory implementations.  No business logic lives here beyond the
//! integrity rules between a car and its engine.

pub mod error;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repository;

pub use error::DbError;
pub use memory::MemoryStore;
pub use pool::{Database, DbConfig, DbPool};
pub use repository::{CarStore, EngineStore, PgCarStore, PgEngineStore};
