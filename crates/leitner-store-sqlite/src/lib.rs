//! SQLite backend for the Leitner card store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Concurrent reviews of the same card
//! are serialised by the `version` column: an update only applies when the
//! stored version still matches the one the caller read.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
