//! SeaORM entities for the `app` schema (see `sql/schema.sql`).

pub mod prelude;

pub mod appointments;
pub mod attendance_records;
pub mod customers;
pub mod services;
pub mod staff;
pub mod visit_items;
pub mod visits;
