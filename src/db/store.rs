//! PostgreSQL implementation of [`SalonStore`].

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::{appointment, attendance, customer, service, staff, visit};
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, AppointmentStatus, AttendanceRecord, CreateAppointment, CreateService, CreateStaff, Customer,
    Service, Staff, UpdateService, Visit, YearMonth, normalize_phone,
};
use crate::store::SalonStore;

#[derive(Clone)]
pub struct PgStore {
    db: DatabaseConnection,
}

impl PgStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl SalonStore for PgStore {
    async fn create_service(&self, data: CreateService) -> Result<Service> {
        data.validate()?;
        Ok(service::create(&self.db, data).await?)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        Ok(service::get_by_id(&self.db, id).await?)
    }

    async fn update_service(&self, id: Uuid, data: UpdateService) -> Result<Option<Service>> {
        service::patch(&self.db, id, data).await
    }

    async fn set_service_deleted(&self, id: Uuid, deleted_at: Option<NaiveDateTime>) -> Result<bool> {
        Ok(service::set_deleted(&self.db, id, deleted_at).await?)
    }

    async fn list_services(&self, include_deleted: bool) -> Result<Vec<Service>> {
        Ok(service::list_all(&self.db, include_deleted).await?)
    }

    async fn create_staff(&self, data: CreateStaff, at: NaiveDateTime) -> Result<Staff> {
        data.validate()?;
        let phone = data.phone.as_deref().map(normalize_phone).transpose()?;
        Ok(staff::create(&self.db, data, phone, at).await?)
    }

    async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>> {
        Ok(staff::get_by_id(&self.db, id).await?)
    }

    async fn list_staff(&self, active_only: bool) -> Result<Vec<Staff>> {
        Ok(staff::list(&self.db, active_only).await?)
    }

    async fn set_staff_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>> {
        Ok(staff::set_active(&self.db, id, active).await?)
    }

    async fn upsert_customer(
        &self,
        phone: &str,
        name: &str,
        email: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<Customer> {
        Ok(customer::upsert(&self.db, phone, name, email, at).await?)
    }

    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>> {
        Ok(customer::find(&self.db, phone).await?)
    }

    async fn list_appointments(&self, stylist_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>> {
        Ok(appointment::list_for_stylist_day(&self.db, stylist_id, date).await?)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(appointment::get_by_id(&self.db, id).await?)
    }

    async fn create_appointment_if_free(&self, data: CreateAppointment, at: NaiveDateTime) -> Result<Appointment> {
        match appointment::insert_if_free(&self.db, data, at).await {
            // Unique index on live (stylist, date, start) lost a race.
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                Err(AppError::conflict("Slot was booked concurrently"))
            }
            other => other,
        }
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        appointment::update_status(&self.db, id, expected, next).await
    }

    async fn list_punch_records(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<AttendanceRecord>> {
        Ok(attendance::list_for_month(&self.db, staff_id, month).await?)
    }

    async fn active_punch_record(&self, staff_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        Ok(attendance::find_active(&self.db, staff_id, date).await?)
    }

    async fn upsert_punch_in(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord> {
        match attendance::punch_in(&self.db, staff_id, date, at).await {
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                Err(AppError::conflict(format!("Already punched in on {date}")))
            }
            other => other,
        }
    }

    async fn upsert_punch_out(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord> {
        attendance::punch_out(&self.db, staff_id, date, at).await
    }

    async fn delete_punch_record(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<bool> {
        Ok(attendance::soft_delete(&self.db, staff_id, date, at).await?)
    }

    async fn create_visit(&self, visit: &Visit) -> Result<()> {
        Ok(visit::insert(&self.db, visit).await?)
    }

    async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>> {
        Ok(visit::get_by_id(&self.db, id).await?)
    }

    async fn save_visit(&self, prior: &Visit, visit: &Visit) -> Result<()> {
        visit::save(&self.db, prior, visit).await
    }

    async fn list_completed_visits(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<Visit>> {
        let visits = visit::list_completed_for_month(&self.db, month).await?;
        Ok(visits.into_iter().filter(|v| v.involves(staff_id)).collect())
    }
}

fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_)))
}
