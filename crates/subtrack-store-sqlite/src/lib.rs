//! SQLite backend for the subtrack subscription store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Statements with optional filters are
//! assembled by [`query::QueryBuilder`].

mod cancel;
mod encode;
mod schema;
mod store;

pub mod error;
pub mod query;

pub use error::{Error, Result};
pub use store::SqliteStore;
