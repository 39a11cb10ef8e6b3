//! Availability filter: flags candidate slots that collide with bookings.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::models::Appointment;

/// A candidate slot and whether it can be booked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStatus {
    pub time: NaiveTime,
    pub available: bool,
    /// First appointment blocking this slot, if booked.
    pub blocked_by: Option<Uuid>,
}

/// One stylist's slot grid for a day.
#[derive(Debug, Clone, Serialize)]
pub struct DayAvailability {
    pub stylist_id: Uuid,
    pub date: NaiveDate,
    pub duration_minutes: u32,
    pub slots: Vec<SlotStatus>,
}

impl DayAvailability {
    pub fn available(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        self.slots.iter().filter(|s| s.available).map(|s| s.time)
    }

    pub fn booked(&self) -> impl Iterator<Item = NaiveTime> + '_ {
        self.slots.iter().filter(|s| !s.available).map(|s| s.time)
    }

    pub fn is_available(&self, time: NaiveTime) -> bool {
        self.slots.iter().any(|s| s.time == time && s.available)
    }
}

/// Mark each slot booked or available for a service of `duration_minutes`.
///
/// Booked slots are kept in the output so callers can render them disabled.
/// Cancelled appointments never block.
pub fn partition(
    slots: &[NaiveTime],
    duration_minutes: u32,
    appointments: &[Appointment],
) -> Vec<SlotStatus> {
    slots
        .iter()
        .map(|&time| {
            let blocked_by = appointments
                .iter()
                .find(|a| a.overlaps(time, duration_minutes))
                .map(|a| a.id);
            SlotStatus {
                time,
                available: blocked_by.is_none(),
                blocked_by,
            }
        })
        .collect()
}

/// Suggest an alternative: first free slot at or after `requested`,
/// otherwise the latest free slot before it.
pub fn next_available(slots: &[SlotStatus], requested: NaiveTime) -> Option<NaiveTime> {
    slots
        .iter()
        .find(|s| s.available && s.time >= requested)
        .or_else(|| slots.iter().rev().find(|s| s.available && s.time < requested))
        .map(|s| s.time)
}
