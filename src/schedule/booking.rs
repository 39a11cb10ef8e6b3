//! Booking validator and appointment lifecycle service.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::availability::{DayAvailability, next_available, partition};
use super::slots::{generate_slots, is_on_grid};
use super::SlotPolicy;
use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::{
    Appointment, AppointmentSource, AppointmentStatus, CreateAppointment, Service, Staff, normalize_email,
    normalize_phone,
};
use crate::retry::{RetryPolicy, with_retry};
use crate::store::SalonStore;

/// A booking as submitted from the front desk or the public site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: Uuid,
    pub stylist_id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub source: AppointmentSource,
    pub notes: Option<String>,
}

/// Slot lookup, booking and status changes over a [`SalonStore`].
pub struct BookingService {
    store: Arc<dyn SalonStore>,
    clock: Arc<dyn Clock>,
    policy: SlotPolicy,
    retry: RetryPolicy,
}

impl BookingService {
    pub fn new(store: Arc<dyn SalonStore>, clock: Arc<dyn Clock>, policy: SlotPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn policy(&self) -> &SlotPolicy {
        &self.policy
    }

    /// Slot grid for a stylist and service on a date, with booked slots flagged.
    pub async fn available_slots(&self, stylist_id: Uuid, date: NaiveDate, service_id: Uuid) -> Result<DayAvailability> {
        let service = self.bookable_service(service_id).await?;
        self.bookable_stylist(stylist_id).await?;
        self.day_availability(stylist_id, date, service.duration_minutes).await
    }

    /// Re-derive availability from current storage state.
    ///
    /// Never trusts a previously rendered grid: bookings may have landed
    /// between display and submission.
    pub async fn is_available(
        &self,
        stylist_id: Uuid,
        date: NaiveDate,
        time: NaiveTime,
        duration_minutes: u32,
    ) -> Result<bool> {
        let day = self.day_availability(stylist_id, date, duration_minutes).await?;
        Ok(day.is_available(time))
    }

    /// Validate and persist a booking with a conditional write.
    pub async fn book(&self, request: BookingRequest) -> Result<Appointment> {
        let customer_name = request.customer_name.trim().to_string();
        if customer_name.is_empty() {
            return Err(AppError::validation("Customer name is required"));
        }
        let phone = normalize_phone(&request.customer_phone)?;
        let email = normalize_email(request.customer_email.as_deref())?;

        let service = self.bookable_service(request.service_id).await?;
        self.bookable_stylist(request.stylist_id).await?;
        self.check_slot_shape(request.date, request.start_time, service.duration_minutes)?;

        let now = self.clock.now();
        self.store
            .upsert_customer(&phone, &customer_name, email.as_deref(), now)
            .await?;

        let data = CreateAppointment {
            customer_name,
            customer_phone: phone,
            customer_email: email,
            service_id: service.id,
            stylist_id: request.stylist_id,
            date: request.date,
            start_time: request.start_time,
            duration_minutes: service.duration_minutes,
            status: request.source.initial_status(),
            source: request.source,
            notes: request.notes.filter(|n| !n.trim().is_empty()),
        };

        match self.store.create_appointment_if_free(data, now).await {
            Ok(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    stylist_id = %appointment.stylist_id,
                    date = %appointment.date,
                    time = %appointment.start_time.format("%H:%M"),
                    status = %appointment.status,
                    "Appointment booked"
                );
                Ok(appointment)
            }
            Err(AppError::Conflict(reason)) => {
                let suggestion = self
                    .suggest_alternative(request.stylist_id, request.date, request.start_time, service.duration_minutes)
                    .await;
                warn!(
                    stylist_id = %request.stylist_id,
                    date = %request.date,
                    time = %request.start_time.format("%H:%M"),
                    suggestion = ?suggestion,
                    "Booking rejected: {reason}"
                );
                let message = match suggestion {
                    Some(alt) => format!(
                        "{} is no longer available, next available time is {}",
                        request.start_time.format("%H:%M"),
                        alt.format("%H:%M")
                    ),
                    None => format!(
                        "{} is no longer available and the stylist has no other free slot that day",
                        request.start_time.format("%H:%M")
                    ),
                };
                Err(AppError::slot_unavailable(message, suggestion))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn confirm(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, AppointmentStatus::Confirmed).await
    }

    pub async fn complete(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, AppointmentStatus::Completed).await
    }

    /// Cancel and release the slot.
    pub async fn cancel(&self, id: Uuid) -> Result<Appointment> {
        self.transition(id, AppointmentStatus::Cancelled).await
    }

    /// Apply a lifecycle transition, rejecting moves the lifecycle forbids.
    pub async fn transition(&self, id: Uuid, next: AppointmentStatus) -> Result<Appointment> {
        let current = with_retry(&self.retry, "get_appointment", || self.store.get_appointment(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {id}")))?;

        if !current.status.can_transition_to(next) {
            return Err(AppError::invalid_transition(current.status, next));
        }

        // Conditional on the status just read; a concurrent change surfaces as Conflict.
        let updated = self
            .store
            .update_appointment_status(id, current.status, next)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Appointment {id}")))?;

        info!(appointment_id = %id, from = %current.status, to = %next, "Appointment status changed");
        Ok(updated)
    }

    async fn day_availability(&self, stylist_id: Uuid, date: NaiveDate, duration_minutes: u32) -> Result<DayAvailability> {
        let now = self.clock.now();
        let candidates = generate_slots(&self.policy, date, duration_minutes, now);
        let appointments = if candidates.is_empty() {
            Vec::new()
        } else {
            with_retry(&self.retry, "list_appointments", || {
                self.store.list_appointments(stylist_id, date)
            })
            .await?
        };

        let slots = partition(&candidates, duration_minutes, &appointments);
        debug!(
            stylist_id = %stylist_id,
            date = %date,
            candidates = candidates.len(),
            booked = slots.iter().filter(|s| !s.available).count(),
            "Computed availability"
        );

        Ok(DayAvailability {
            stylist_id,
            date,
            duration_minutes,
            slots,
        })
    }

    async fn suggest_alternative(
        &self,
        stylist_id: Uuid,
        date: NaiveDate,
        requested: NaiveTime,
        duration_minutes: u32,
    ) -> Option<NaiveTime> {
        match self.day_availability(stylist_id, date, duration_minutes).await {
            Ok(day) => next_available(&day.slots, requested),
            Err(e) => {
                warn!("Could not compute alternative slot: {e}");
                None
            }
        }
    }

    fn check_slot_shape(&self, date: NaiveDate, time: NaiveTime, duration_minutes: u32) -> Result<()> {
        let now = self.clock.now();
        if date < now.date() {
            return Err(AppError::validation(format!("Cannot book in the past: {date}")));
        }
        if !is_on_grid(&self.policy, time, duration_minutes) {
            return Err(AppError::validation(format!(
                "{} is not a bookable start time ({}-{}, every {} min)",
                time.format("%H:%M"),
                self.policy.open.format("%H:%M"),
                self.policy.close.format("%H:%M"),
                self.policy.slot_minutes
            )));
        }
        if !generate_slots(&self.policy, date, duration_minutes, now).contains(&time) {
            return Err(AppError::validation(format!(
                "{} on {date} has already passed",
                time.format("%H:%M")
            )));
        }
        Ok(())
    }

    async fn bookable_service(&self, id: Uuid) -> Result<Service> {
        let service = with_retry(&self.retry, "get_service", || self.store.get_service(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {id}")))?;
        if !service.is_bookable() {
            return Err(AppError::validation(format!("Service '{}' is not available", service.name)));
        }
        Ok(service)
    }

    async fn bookable_stylist(&self, id: Uuid) -> Result<Staff> {
        let staff = with_retry(&self.retry, "get_staff", || self.store.get_staff(id))
            .await?
            .ok_or_else(|| AppError::not_found(format!("Stylist {id}")))?;
        if !staff.is_bookable() {
            return Err(AppError::validation(format!("{} is not taking bookings", staff.full_name)));
        }
        Ok(staff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::{CreateService, CreateStaff, GenderRestriction, StaffRole};
    use crate::store::MemoryStore;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn june(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    struct Fixture {
        service: BookingService,
        clock: Arc<FixedClock>,
        stylist: Uuid,
        haircut: Uuid,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(june(9).and_time(at(12, 0))));
        let stylist = store
            .create_staff(
                CreateStaff {
                    full_name: "Sam Rivera".to_string(),
                    role: StaffRole::Stylist,
                    phone: None,
                    email: None,
                },
                clock.now(),
            )
            .await
            .unwrap();
        let haircut = store
            .create_service(CreateService {
                name: "Haircut".to_string(),
                category: "Hair".to_string(),
                price_cents: 3_000,
                duration_minutes: 60,
                gender: GenderRestriction::Any,
            })
            .await
            .unwrap();

        let policy = SlotPolicy {
            open: at(9, 0),
            close: at(18, 0),
            slot_minutes: 60,
        };
        let service = BookingService::new(store, clock.clone(), policy).with_retry_policy(RetryPolicy::none());
        Fixture {
            service,
            clock,
            stylist: stylist.id,
            haircut: haircut.id,
        }
    }

    fn request(f: &Fixture, time: NaiveTime) -> BookingRequest {
        BookingRequest {
            customer_name: "Ana".to_string(),
            customer_phone: "555-123-4567".to_string(),
            customer_email: None,
            service_id: f.haircut,
            stylist_id: f.stylist,
            date: june(10),
            start_time: time,
            source: AppointmentSource::Frontend,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_frontend_booking_starts_pending() {
        let f = fixture().await;
        let appt = f.service.book(request(&f, at(14, 0))).await.unwrap();
        assert_eq!(appt.status, AppointmentStatus::Pending);
        assert_eq!(appt.customer_phone, "5551234567");
        assert_eq!(appt.duration_minutes, 60);
    }

    #[tokio::test]
    async fn test_double_booking_rejected_with_suggestion() {
        let f = fixture().await;
        f.service.book(request(&f, at(14, 0))).await.unwrap();

        let err = f.service.book(request(&f, at(14, 0))).await.unwrap_err();
        match err {
            AppError::SlotUnavailable { suggestion, .. } => assert_eq!(suggestion, Some(at(15, 0))),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejects_off_grid_and_past_times() {
        let f = fixture().await;
        assert!(matches!(
            f.service.book(request(&f, at(14, 30))).await,
            Err(AppError::Validation(_))
        ));

        let mut past = request(&f, at(10, 0));
        past.date = june(8);
        assert!(matches!(f.service.book(past).await, Err(AppError::Validation(_))));

        let mut earlier_today = request(&f, at(10, 0));
        earlier_today.date = june(9);
        assert!(matches!(f.service.book(earlier_today).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_rejects_malformed_phone() {
        let f = fixture().await;
        let mut bad = request(&f, at(14, 0));
        bad.customer_phone = "12-34".to_string();
        assert!(matches!(f.service.book(bad).await, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cancel_releases_slot() {
        let f = fixture().await;
        let appt = f.service.book(request(&f, at(14, 0))).await.unwrap();
        assert!(!f.service.is_available(f.stylist, june(10), at(14, 0), 60).await.unwrap());

        f.service.cancel(appt.id).await.unwrap();
        assert!(f.service.is_available(f.stylist, june(10), at(14, 0), 60).await.unwrap());
        assert!(f.service.book(request(&f, at(14, 0))).await.is_ok());
    }

    #[tokio::test]
    async fn test_lifecycle_transitions() {
        let f = fixture().await;
        let appt = f.service.book(request(&f, at(11, 0))).await.unwrap();

        assert!(matches!(
            f.service.complete(appt.id).await,
            Err(AppError::InvalidTransition { .. })
        ));
        assert_eq!(f.service.confirm(appt.id).await.unwrap().status, AppointmentStatus::Confirmed);
        assert_eq!(f.service.complete(appt.id).await.unwrap().status, AppointmentStatus::Completed);
        assert!(f.service.cancel(appt.id).await.is_err());
    }

    #[tokio::test]
    async fn test_today_hides_elapsed_slots() {
        let f = fixture().await;
        f.clock.set(june(10).and_time(at(13, 20)));
        let day = f.service.available_slots(f.stylist, june(10), f.haircut).await.unwrap();
        assert_eq!(day.slots.first().map(|s| s.time), Some(at(14, 0)));
    }
}
