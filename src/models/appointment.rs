//! Appointment models and status lifecycle.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

/// Appointment lifecycle: `pending -> confirmed -> completed`, or `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Cancelled appointments release their slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Completed)
                | (Self::Confirmed, Self::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "confirmed" => Ok(Self::Confirmed),
            "completed" => Ok(Self::Completed),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(AppError::validation(format!("Unknown appointment status: {other}"))),
        }
    }
}

/// Where a booking was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentSource {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "frontend")]
    Frontend,
}

impl AppointmentSource {
    /// Front-desk bookings are confirmed on entry; online ones wait for review.
    pub fn initial_status(&self) -> AppointmentStatus {
        match self {
            Self::Admin => AppointmentStatus::Confirmed,
            Self::Frontend => AppointmentStatus::Pending,
        }
    }
}

/// A stored appointment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: Uuid,
    pub stylist_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    pub notes: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Appointment {
    /// Whether this appointment occupies any part of `[start, start + duration)`.
    pub fn overlaps(&self, start: NaiveTime, duration_minutes: u32) -> bool {
        self.status.holds_slot()
            && intervals_overlap(
                minute_of_day(self.start_time),
                self.duration_minutes,
                minute_of_day(start),
                duration_minutes,
            )
    }
}

/// DTO for creating an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointment {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: Uuid,
    pub stylist_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    pub notes: Option<String>,
}

impl CreateAppointment {
    pub fn into_appointment(self, id: Uuid, created_at: NaiveDateTime) -> Appointment {
        Appointment {
            id,
            customer_name: self.customer_name,
            customer_phone: self.customer_phone,
            customer_email: self.customer_email,
            service_id: self.service_id,
            stylist_id: self.stylist_id,
            date: self.date,
            start_time: self.start_time,
            duration_minutes: self.duration_minutes,
            status: self.status,
            source: self.source,
            notes: self.notes,
            created_at,
        }
    }
}

/// Minutes since midnight.
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

/// Half-open interval overlap on minute offsets.
pub fn intervals_overlap(a_start: u32, a_len: u32, b_start: u32, b_len: u32) -> bool {
    a_start < b_start.saturating_add(b_len) && b_start < a_start.saturating_add(a_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn appointment(start: NaiveTime, duration: u32, status: AppointmentStatus) -> Appointment {
        CreateAppointment {
            customer_name: "Mia".to_string(),
            customer_phone: "5551234567".to_string(),
            customer_email: None,
            service_id: Uuid::new_v4(),
            stylist_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2025, 6, 10).unwrap(),
            start_time: start,
            duration_minutes: duration,
            status,
            source: AppointmentSource::Admin,
            notes: None,
        }
        .into_appointment(Uuid::new_v4(), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap().and_time(at(9, 0)))
    }

    #[test]
    fn test_status_transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Confirmed));
    }

    #[test]
    fn test_overlap_is_half_open() {
        let appt = appointment(at(14, 0), 60, AppointmentStatus::Confirmed);
        assert!(appt.overlaps(at(14, 0), 60));
        assert!(appt.overlaps(at(13, 30), 60));
        assert!(appt.overlaps(at(14, 59), 1));
        assert!(!appt.overlaps(at(13, 0), 60));
        assert!(!appt.overlaps(at(15, 0), 60));
    }

    #[test]
    fn test_overlap_with_huge_lengths() {
        assert!(intervals_overlap(600, u32::MAX, 900, 60));
        assert!(intervals_overlap(900, 60, 600, u32::MAX));
        assert!(!intervals_overlap(u32::MAX - 10, u32::MAX, 600, 60));
        assert!(!intervals_overlap(600, 60, u32::MAX - 10, u32::MAX));
    }

    #[test]
    fn test_cancelled_never_overlaps() {
        let appt = appointment(at(14, 0), 60, AppointmentStatus::Cancelled);
        assert!(!appt.overlaps(at(14, 0), 60));
    }

    #[test]
    fn test_parse_status() {
        assert_eq!("Confirmed".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Confirmed);
        assert_eq!("canceled".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::Cancelled);
        assert!("done".parse::<AppointmentStatus>().is_err());
    }
}
