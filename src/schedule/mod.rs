//! Appointment scheduling: slot generation, availability and booking.
//!
//! One canonical grid is used by every booking entry point: business hours
//! and granularity come from [`SlotPolicy`], and conflicts are detected by
//! interval overlap against non-cancelled appointments.

pub mod availability;
pub mod booking;
pub mod slots;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub use availability::{DayAvailability, SlotStatus, next_available, partition};
pub use booking::{BookingRequest, BookingService};
pub use slots::generate_slots;

/// Business-hours window and slot granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotPolicy {
    pub open: NaiveTime,
    pub close: NaiveTime,
    pub slot_minutes: u32,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            open: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            close: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or(NaiveTime::MIN),
            slot_minutes: 30,
        }
    }
}
