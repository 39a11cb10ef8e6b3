//! Salon front-desk core: slot scheduling, booking, attendance and commission.

pub mod attendance;
pub mod clock;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod export;
pub mod models;
pub mod payroll;
pub mod retry;
pub mod schedule;
pub mod store;
pub mod visits;

pub use error::{AppError, Result};
