//! Database connection pool and repositories.

pub mod appointment;
pub mod attendance;
pub mod connection;
pub mod customer;
pub mod service;
pub mod staff;
pub mod store;
pub mod visit;

pub use connection::{TableCounts, apply_schema, connect, get_table_counts, get_version, test_connection};
pub use store::PgStore;
