//! Punch-in / punch-out service.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::AttendanceRecord;
use crate::store::SalonStore;

/// Records staff attendance against the salon clock.
pub struct AttendanceService {
    store: Arc<dyn SalonStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(store: Arc<dyn SalonStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Open today's record. Conflict if today already has one.
    pub async fn punch_in(&self, staff_id: Uuid) -> Result<AttendanceRecord> {
        self.require_active_staff(staff_id).await?;
        let now = self.clock.now();
        let record = self.store.upsert_punch_in(staff_id, now.date(), now).await?;
        info!(staff_id = %staff_id, at = %now.format("%Y-%m-%d %H:%M"), "Punched in");
        Ok(record)
    }

    /// Close today's open record. Conflict if there is none.
    pub async fn punch_out(&self, staff_id: Uuid) -> Result<AttendanceRecord> {
        self.require_active_staff(staff_id).await?;
        let now = self.clock.now();
        let record = self.store.upsert_punch_out(staff_id, now.date(), now).await?;
        info!(
            staff_id = %staff_id,
            at = %now.format("%Y-%m-%d %H:%M"),
            hours = record.work_hours().unwrap_or_default(),
            "Punched out"
        );
        Ok(record)
    }

    /// Today's live record, open or closed.
    pub async fn today(&self, staff_id: Uuid) -> Result<Option<AttendanceRecord>> {
        let today = self.clock.now().date();
        self.store.active_punch_record(staff_id, today).await
    }

    /// Administrative reset of a day. The record is kept as soft-deleted.
    pub async fn delete_record(&self, staff_id: Uuid, date: NaiveDate) -> Result<()> {
        let now = self.clock.now();
        if !self.store.delete_punch_record(staff_id, date, now).await? {
            return Err(AppError::not_found(format!("Attendance for {date}")));
        }
        info!(staff_id = %staff_id, date = %date, "Attendance record deleted");
        Ok(())
    }

    async fn require_active_staff(&self, staff_id: Uuid) -> Result<()> {
        match self.store.get_staff(staff_id).await? {
            Some(staff) if staff.is_active => Ok(()),
            Some(staff) => Err(AppError::validation(format!("{} is inactive", staff.full_name))),
            None => Err(AppError::not_found(format!("Staff {staff_id}"))),
        }
    }
}
