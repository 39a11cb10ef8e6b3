//! In-process store backed by maps under a single lock.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::SalonStore;
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, AppointmentStatus, AttendanceRecord, CreateAppointment, CreateService, CreateStaff, Customer,
    GenderRestriction, Service, Staff, StaffRole, UpdateService, Visit, VisitStatus, YearMonth,
};

#[derive(Default)]
struct Tables {
    services: HashMap<Uuid, Service>,
    staff: HashMap<Uuid, Staff>,
    customers: HashMap<String, Customer>,
    appointments: HashMap<Uuid, Appointment>,
    attendance: Vec<AttendanceRecord>,
    visits: HashMap<Uuid, Visit>,
}

/// Store used by tests and the CLI's `--memory` mode.
///
/// Every conditional write holds the write lock across check and insert.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

/// Stylist seeded by [`MemoryStore::with_demo_catalogue`].
pub const DEMO_STYLIST_ID: Uuid = Uuid::from_u128(0x5a10_0000_0000_0000_0000_0000_0000_0001);
/// Service seeded by [`MemoryStore::with_demo_catalogue`].
pub const DEMO_SERVICE_ID: Uuid = Uuid::from_u128(0x5a10_0000_0000_0000_0000_0000_0000_0002);

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding one stylist and one 60-minute service under fixed ids.
    pub fn with_demo_catalogue(at: NaiveDateTime) -> Self {
        let mut tables = Tables::default();
        tables.staff.insert(
            DEMO_STYLIST_ID,
            Staff {
                id: DEMO_STYLIST_ID,
                full_name: "Demo Stylist".to_string(),
                role: StaffRole::Stylist,
                phone: None,
                email: None,
                is_active: true,
                created_at: at,
            },
        );
        tables.services.insert(
            DEMO_SERVICE_ID,
            Service {
                id: DEMO_SERVICE_ID,
                name: "Haircut".to_string(),
                category: "Hair".to_string(),
                price_cents: 4_500,
                duration_minutes: 60,
                gender: GenderRestriction::Any,
                is_active: true,
                deleted_at: None,
            },
        );
        Self {
            tables: RwLock::new(tables),
        }
    }
}

fn active_record_mut(tables: &mut Tables, staff_id: Uuid, date: NaiveDate) -> Option<&mut AttendanceRecord> {
    tables
        .attendance
        .iter_mut()
        .find(|r| r.staff_id == staff_id && r.work_date == date && !r.is_deleted())
}

#[async_trait]
impl SalonStore for MemoryStore {
    async fn create_service(&self, data: CreateService) -> Result<Service> {
        data.validate()?;
        let service = Service {
            id: Uuid::new_v4(),
            name: data.name,
            category: data.category,
            price_cents: data.price_cents,
            duration_minutes: data.duration_minutes,
            gender: data.gender,
            is_active: true,
            deleted_at: None,
        };
        self.tables.write().await.services.insert(service.id, service.clone());
        Ok(service)
    }

    async fn get_service(&self, id: Uuid) -> Result<Option<Service>> {
        Ok(self.tables.read().await.services.get(&id).cloned())
    }

    async fn update_service(&self, id: Uuid, data: UpdateService) -> Result<Option<Service>> {
        let mut tables = self.tables.write().await;
        match tables.services.get_mut(&id) {
            Some(service) => {
                data.apply(service)?;
                Ok(Some(service.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_service_deleted(&self, id: Uuid, deleted_at: Option<NaiveDateTime>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.services.get_mut(&id) {
            Some(service) => {
                service.deleted_at = deleted_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_services(&self, include_deleted: bool) -> Result<Vec<Service>> {
        let tables = self.tables.read().await;
        let mut services: Vec<Service> = tables
            .services
            .values()
            .filter(|s| include_deleted || s.deleted_at.is_none())
            .cloned()
            .collect();
        services.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
        Ok(services)
    }

    async fn create_staff(&self, data: CreateStaff, at: NaiveDateTime) -> Result<Staff> {
        data.validate()?;
        let phone = data.phone.as_deref().map(crate::models::normalize_phone).transpose()?;
        let staff = Staff {
            id: Uuid::new_v4(),
            full_name: data.full_name,
            role: data.role,
            phone,
            email: data.email,
            is_active: true,
            created_at: at,
        };
        self.tables.write().await.staff.insert(staff.id, staff.clone());
        Ok(staff)
    }

    async fn get_staff(&self, id: Uuid) -> Result<Option<Staff>> {
        Ok(self.tables.read().await.staff.get(&id).cloned())
    }

    async fn list_staff(&self, active_only: bool) -> Result<Vec<Staff>> {
        let tables = self.tables.read().await;
        let mut staff: Vec<Staff> = tables
            .staff
            .values()
            .filter(|s| !active_only || s.is_active)
            .cloned()
            .collect();
        staff.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(staff)
    }

    async fn set_staff_active(&self, id: Uuid, active: bool) -> Result<Option<Staff>> {
        let mut tables = self.tables.write().await;
        Ok(tables.staff.get_mut(&id).map(|staff| {
            staff.is_active = active;
            staff.clone()
        }))
    }

    async fn upsert_customer(
        &self,
        phone: &str,
        name: &str,
        email: Option<&str>,
        at: NaiveDateTime,
    ) -> Result<Customer> {
        let mut tables = self.tables.write().await;
        let customer = tables
            .customers
            .entry(phone.to_string())
            .and_modify(|c| {
                c.name = name.to_string();
                if let Some(email) = email {
                    c.email = Some(email.to_string());
                }
            })
            .or_insert_with(|| Customer {
                phone: phone.to_string(),
                name: name.to_string(),
                email: email.map(str::to_string),
                created_at: at,
            });
        Ok(customer.clone())
    }

    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>> {
        Ok(self.tables.read().await.customers.get(phone).cloned())
    }

    async fn list_appointments(&self, stylist_id: Uuid, date: NaiveDate) -> Result<Vec<Appointment>> {
        let tables = self.tables.read().await;
        let mut appointments: Vec<Appointment> = tables
            .appointments
            .values()
            .filter(|a| a.stylist_id == stylist_id && a.date == date)
            .cloned()
            .collect();
        appointments.sort_by_key(|a| (a.start_time, a.created_at));
        Ok(appointments)
    }

    async fn get_appointment(&self, id: Uuid) -> Result<Option<Appointment>> {
        Ok(self.tables.read().await.appointments.get(&id).cloned())
    }

    async fn create_appointment_if_free(&self, data: CreateAppointment, at: NaiveDateTime) -> Result<Appointment> {
        let mut tables = self.tables.write().await;

        let clash = tables.appointments.values().find(|a| {
            a.stylist_id == data.stylist_id
                && a.date == data.date
                && a.overlaps(data.start_time, data.duration_minutes)
        });
        if let Some(existing) = clash {
            return Err(AppError::conflict(format!(
                "Stylist already booked at {} on {}",
                existing.start_time.format("%H:%M"),
                existing.date
            )));
        }

        let appointment = data.into_appointment(Uuid::new_v4(), at);
        tables.appointments.insert(appointment.id, appointment.clone());
        Ok(appointment)
    }

    async fn update_appointment_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        next: AppointmentStatus,
    ) -> Result<Option<Appointment>> {
        let mut tables = self.tables.write().await;
        match tables.appointments.get_mut(&id) {
            Some(appointment) if appointment.status != expected => Err(AppError::conflict(format!(
                "Appointment {id} is now {}",
                appointment.status
            ))),
            Some(appointment) => {
                appointment.status = next;
                Ok(Some(appointment.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_punch_records(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<AttendanceRecord>> {
        let tables = self.tables.read().await;
        let mut records: Vec<AttendanceRecord> = tables
            .attendance
            .iter()
            .filter(|r| r.staff_id == staff_id && month.contains(r.work_date))
            .cloned()
            .collect();
        records.sort_by_key(|r| (r.work_date, r.punch_in));
        Ok(records)
    }

    async fn active_punch_record(&self, staff_id: Uuid, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .attendance
            .iter()
            .find(|r| r.staff_id == staff_id && r.work_date == date && !r.is_deleted())
            .cloned())
    }

    async fn upsert_punch_in(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = active_record_mut(&mut tables, staff_id, date) {
            return Err(if existing.is_open() {
                AppError::conflict(format!("Already punched in on {date}"))
            } else {
                AppError::conflict(format!("Attendance for {date} is already complete"))
            });
        }

        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            staff_id,
            work_date: date,
            punch_in: at,
            punch_out: None,
            deleted_at: None,
        };
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn upsert_punch_out(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<AttendanceRecord> {
        let mut tables = self.tables.write().await;
        match active_record_mut(&mut tables, staff_id, date) {
            Some(record) if record.is_open() => {
                if at < record.punch_in {
                    return Err(AppError::validation("Punch-out cannot be before punch-in"));
                }
                record.punch_out = Some(at);
                Ok(record.clone())
            }
            Some(_) => Err(AppError::conflict(format!("Already punched out on {date}"))),
            None => Err(AppError::conflict(format!("No punch-in recorded on {date}"))),
        }
    }

    async fn delete_punch_record(&self, staff_id: Uuid, date: NaiveDate, at: NaiveDateTime) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match active_record_mut(&mut tables, staff_id, date) {
            Some(record) => {
                record.deleted_at = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn create_visit(&self, visit: &Visit) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.visits.contains_key(&visit.id) {
            return Err(AppError::conflict(format!("Visit {} already exists", visit.id)));
        }
        tables.visits.insert(visit.id, visit.clone());
        Ok(())
    }

    async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>> {
        Ok(self.tables.read().await.visits.get(&id).cloned())
    }

    async fn save_visit(&self, prior: &Visit, visit: &Visit) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.visits.get_mut(&visit.id) {
            Some(existing) if !existing.same_revision(prior) => Err(AppError::conflict(format!(
                "Visit {} was changed by another session",
                visit.id
            ))),
            Some(existing) => {
                *existing = visit.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("Visit {}", visit.id))),
        }
    }

    async fn list_completed_visits(&self, staff_id: Uuid, month: YearMonth) -> Result<Vec<Visit>> {
        let tables = self.tables.read().await;
        let mut visits: Vec<Visit> = tables
            .visits
            .values()
            .filter(|v| v.status == VisitStatus::Completed && v.involves(staff_id))
            .filter(|v| v.completed_at.is_some_and(|at| month.contains(at.date())))
            .cloned()
            .collect();
        visits.sort_by_key(|v| v.completed_at);
        Ok(visits)
    }
}
