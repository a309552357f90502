//! SQLite backends for the resepti source store and warehouse.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every write method runs inside one
//! SQLite transaction on that thread.

mod encode;
mod schema;
mod source;
mod warehouse;

pub mod error;

pub use error::{Error, Result};
pub use schema::{SOURCE_SCHEMA, WAREHOUSE_SCHEMA};
pub use source::SqliteSource;
pub use warehouse::SqliteWarehouse;

#[cfg(test)]
mod tests;
