//! Attendance records: one punch-in/punch-out pair per staff member per day.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub staff_id: Uuid,
    pub work_date: NaiveDate,
    pub punch_in: NaiveDateTime,
    pub punch_out: Option<NaiveDateTime>,
    /// Soft-delete marker. Deleted records stay for payroll history.
    pub deleted_at: Option<NaiveDateTime>,
}

impl AttendanceRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Punched in, not yet punched out.
    pub fn is_open(&self) -> bool {
        !self.is_deleted() && self.punch_out.is_none()
    }

    /// Worked hours from punch-in to punch-out; `None` while open.
    pub fn work_hours(&self) -> Option<f64> {
        self.punch_out
            .map(|out| (out - self.punch_in).num_seconds() as f64 / 3600.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_hours() {
        let day = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
        let mut record = AttendanceRecord {
            id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            work_date: day,
            punch_in: day.and_hms_opt(9, 0, 0).unwrap(),
            punch_out: None,
            deleted_at: None,
        };
        assert!(record.is_open());
        assert_eq!(record.work_hours(), None);

        record.punch_out = day.and_hms_opt(17, 30, 0);
        assert!(!record.is_open());
        assert_eq!(record.work_hours(), Some(8.5));
    }
}
