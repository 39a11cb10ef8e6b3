//! Slot generation, availability and booking against the in-memory store.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use salon_desk::AppError;
use salon_desk::clock::{Clock, FixedClock};
use salon_desk::models::{AppointmentSource, AppointmentStatus, CreateService, CreateStaff, GenderRestriction, StaffRole};
use salon_desk::retry::RetryPolicy;
use salon_desk::schedule::{BookingRequest, BookingService, SlotPolicy};
use salon_desk::store::{MemoryStore, SalonStore};
use uuid::Uuid;

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn june(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

struct Salon {
    booking: Arc<BookingService>,
    clock: Arc<FixedClock>,
    stylist: Uuid,
    haircut: Uuid,
}

async fn salon() -> Salon {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(FixedClock::new(june(9).and_time(at(12, 0))));

    let stylist = store
        .create_staff(
            CreateStaff {
                full_name: "Sofia Marin".to_string(),
                role: StaffRole::Stylist,
                phone: Some("(555) 010-2000".to_string()),
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
            price_cents: 4_500,
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
    let booking =
        BookingService::new(store, clock.clone(), policy).with_retry_policy(RetryPolicy::none());

    Salon {
        booking: Arc::new(booking),
        clock,
        stylist: stylist.id,
        haircut: haircut.id,
    }
}

fn request(salon: &Salon, date: NaiveDate, time: NaiveTime, phone: &str) -> BookingRequest {
    BookingRequest {
        customer_name: "Lena Park".to_string(),
        customer_phone: phone.to_string(),
        customer_email: Some("Lena@Example.com".to_string()),
        service_id: salon.haircut,
        stylist_id: salon.stylist,
        date,
        start_time: time,
        source: AppointmentSource::Admin,
        notes: None,
    }
}

#[tokio::test]
async fn test_booked_slot_reported_and_rebooking_rejected() {
    let s = salon().await;
    let appt = s
        .booking
        .book(request(&s, june(10), at(14, 0), "555 200 3000"))
        .await
        .unwrap();
    assert_eq!(appt.status, AppointmentStatus::Confirmed);

    let day = s.booking.available_slots(s.stylist, june(10), s.haircut).await.unwrap();
    assert!(!day.is_available(at(14, 0)));
    assert!(day.booked().any(|t| t == at(14, 0)));
    assert!(day.is_available(at(13, 0)));
    assert!(day.is_available(at(15, 0)));

    let err = s
        .booking
        .book(request(&s, june(10), at(14, 0), "555 200 4000"))
        .await
        .unwrap_err();
    match err {
        AppError::SlotUnavailable { suggestion, .. } => assert_eq!(suggestion, Some(at(15, 0))),
        other => panic!("expected SlotUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_day_is_fully_available() {
    let s = salon().await;
    let day = s.booking.available_slots(s.stylist, june(11), s.haircut).await.unwrap();

    // 09:00 through 17:00 for a 60-minute service closing at 18:00.
    assert_eq!(day.slots.len(), 9);
    assert_eq!(day.available().count(), 9);
    assert_eq!(day.booked().count(), 0);
}

#[tokio::test]
async fn test_past_date_has_no_slots_and_cannot_be_booked() {
    let s = salon().await;
    let day = s.booking.available_slots(s.stylist, june(8), s.haircut).await.unwrap();
    assert!(day.slots.is_empty());

    let err = s
        .booking
        .book(request(&s, june(8), at(10, 0), "555 200 3000"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_today_starts_at_next_boundary() {
    let s = salon().await;
    s.clock.set(june(9).and_time(at(10, 20)));

    let day = s.booking.available_slots(s.stylist, june(9), s.haircut).await.unwrap();
    let first = day.slots.first().map(|slot| slot.time);
    assert_eq!(first, Some(at(11, 0)));
    assert!(day.slots.iter().all(|slot| slot.time >= at(11, 0)));

    let err = s
        .booking
        .book(request(&s, june(9), at(10, 0), "555 200 3000"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_cancel_frees_the_slot() {
    let s = salon().await;
    let appt = s
        .booking
        .book(request(&s, june(10), at(14, 0), "555 200 3000"))
        .await
        .unwrap();

    let cancelled = s.booking.cancel(appt.id).await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    assert!(
        s.booking
            .is_available(s.stylist, june(10), at(14, 0), 60)
            .await
            .unwrap()
    );
    s.booking
        .book(request(&s, june(10), at(14, 0), "555 200 4000"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_status_lifecycle() {
    let s = salon().await;
    let mut req = request(&s, june(10), at(9, 0), "555 200 3000");
    req.source = AppointmentSource::Frontend;
    let appt = s.booking.book(req).await.unwrap();
    assert_eq!(appt.status, AppointmentStatus::Pending);

    // Pending cannot skip straight to completed.
    let err = s.booking.complete(appt.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));

    s.booking.confirm(appt.id).await.unwrap();
    let done = s.booking.complete(appt.id).await.unwrap();
    assert_eq!(done.status, AppointmentStatus::Completed);

    let err = s.booking.cancel(appt.id).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_concurrent_bookings_for_one_slot() {
    let s = salon().await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let booking = s.booking.clone();
        let req = request(&s, june(10), at(16, 0), &format!("555 300 10{i:02}"));
        handles.push(tokio::spawn(async move { booking.book(req).await }));
    }

    let mut booked = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(AppError::SlotUnavailable { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(booked, 1);
    assert_eq!(rejected, 7);
}

#[tokio::test]
async fn test_invalid_customer_details_rejected() {
    let s = salon().await;

    let mut req = request(&s, june(10), at(11, 0), "12");
    let err = s.booking.book(req.clone()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    req.customer_phone = "555 200 3000".to_string();
    req.customer_name = "   ".to_string();
    let err = s.booking.book(req).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
