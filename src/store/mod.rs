//! Persistence seam for the scheduling and attendance core.
//!
//! Writes that guard an invariant (appointment overlap, one attendance
//! record per staff per day) are conditional inside the implementation so
//! the check and the write cannot interleave with another caller.

mod memory;

pub use memory::{DEMO_SERVICE_ID, DEMO_STYLIST_ID, MemoryStore};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{
    Appointment, AppointmentStatus, AttendanceRecord, CreateAppointment, CreateService, CreateStaff, Customer,
    Service, Staff, UpdateService, Visit, YearMonth,
};

#[async_trait]
pub trait SalonStore: Send + Sync {
    // Services
    async fn create_service(&self, data: CreateService) -> Result<Service>;
    async fn get_service(&self, id: Uuid) -> Result<Option<Service>>;
    async fn update_service(&self, id: Uuid, data: UpdateService) -> Result<Option<Service>>;
    /// Soft delete (`Some(at)`) or restore (`None`). Returns false if missing.
    async fn set_service_deleted(&self, id: Uuid, deleted_at: Option<NaiveDateTime>) -> Result<bool>;
    async fn list_services(&self, include_deleted: bool) -> Result<Vec<Service>>;

    // Staff
    async fn create_staff(&self, data: CreateStaff, at: NaiveDateTime) -> Result<Staff>;
    async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>>;
    async fn list_staff(&self, active_only: bool) -> Result<Vec<Staff>>;
    /// Deactivate or reactivate. History is kept either way.
    async fn set_staff_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>>;

    // Customers
    /// Create or refresh a customer keyed by normalized phone.
    async fn upsert_customer(
        &self,
        phone: &str,
        name: &str,
        email: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<Customer>;
    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>>;

    // Appointments
    /// All appointments for the stylist on the date, any status, ordered by start.
    async fn list_appointments(&self, stylist_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>>;
    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>>;
    /// Insert only if no non-cancelled appointment of the stylist overlaps.
    /// Fails with `AppError::Conflict` otherwise.
    async fn create_appointment_if_free(&self, data: CreateAppointment, at: NaiveDateTime) -> Result<Appointment>;
    /// Move from `expected` to `next`. Conflict if the stored status is no
    /// longer `expected`, `None` if the appointment is missing.
    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<Option<Appointment>>;

    // Attendance
    /// Records for the staff member in the month, including soft-deleted ones.
    async fn list_punch_records(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<AttendanceRecord>>;
    /// The non-deleted record for the day, if any.
    async fn active_punch_record(&self, staff_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>>;
    /// Open the day. Conflict if a non-deleted record already exists.
    async fn upsert_punch_in(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord>;
    /// Close the day. Conflict unless an open record exists.
    async fn upsert_punch_out(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord>;
    /// Soft-delete the day's record. Returns false if there was none.
    async fn delete_punch_record(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<bool>;

    // Visits
    async fn create_visit(&self, visit: &Visit) -> Result<()>;
    async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>>;
    /// Replace a visit loaded as `prior`. Conflict if the stored visit has
    /// since changed status or items, NotFound if it is missing.
    async fn save_visit(&self, prior: &Visit, visit: &Visit) -> Result<()>;
    /// Completed visits finished in the month with revenue credited to the staff member.
    async fn list_completed_visits(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<Visit>>;
}
