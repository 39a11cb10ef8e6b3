//! Appointment repository with conditional booking.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::*;
use uuid::Uuid;

use crate::entities::{appointments, prelude::*};
use crate::error::AppError;
use crate::models::{Appointment, AppointmentStatus, CreateAppointment};

fn to_domain(m: appointments::Model) -> Appointment {
    Appointment {
        id: m.id,
        customer_name: m.customer_name,
        customer_phone: m.customer_phone,
        customer_email: m.customer_email,
        service_id: m.service_id,
        stylist_id: m.stylist_id,
        date: m.appointment_date,
        start_time: m.start_time,
        duration_minutes: m.duration_minutes.max(0) as u32,
        status: m.status,
        source: m.source,
        notes: m.notes,
        created_at: m.created_at,
    }
}

/// All appointments of a stylist on a date, ordered by start time.
pub async fn list_for_stylist_day<C: ConnectionTrait>(
    db: &C,
    stylist_id: Uuid,
    date: NaiveDate,
) -> Result<Vec<Appointment>, DbErr> {
    let rows = Appointments::find()
        .filter(appointments::Column::StylistId.eq(stylist_id))
        .filter(appointments::Column::AppointmentDate.eq(date))
        .order_by_asc(appointments::Column::StartTime)
        .order_by_asc(appointments::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_domain).collect())
}

/// Get appointment by ID.
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Appointment>, DbErr> {
    Ok(Appointments::find_by_id(id).one(db).await?.map(to_domain))
}

/// Insert the appointment only if the stylist is free for its whole interval.
///
/// Runs in one transaction holding the stylist's row lock, so two bookings
/// for the same stylist cannot both pass the overlap check.
pub async fn insert_if_free(
    db: &DatabaseConnection,
    data: CreateAppointment,
    at: NaiveDateTime,
) -> crate::Result<Appointment> {
    let txn = db.begin().await?;

    if super::staff::lock(&txn, data.stylist_id).await?.is_none() {
        txn.rollback().await?;
        return Err(AppError::not_found(format!("Stylist {}", data.stylist_id)));
    }

    let existing = list_for_stylist_day(&txn, data.stylist_id, data.date).await?;
    if let Some(clash) = existing
        .iter()
        .find(|a| a.overlaps(data.start_time, data.duration_minutes))
    {
        let message = format!(
            "Stylist already booked at {} on {}",
            clash.start_time.format("%H:%M"),
            clash.date
        );
        txn.rollback().await?;
        return Err(AppError::conflict(message));
    }

    let model = appointments::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_name: Set(data.customer_name),
        customer_phone: Set(data.customer_phone),
        customer_email: Set(data.customer_email),
        service_id: Set(data.service_id),
        stylist_id: Set(data.stylist_id),
        appointment_date: Set(data.date),
        start_time: Set(data.start_time),
        duration_minutes: Set(super::service::minutes_column(data.duration_minutes)?),
        status: Set(data.status),
        source: Set(data.source),
        notes: Set(data.notes),
        created_at: Set(at),
    };
    let inserted = model.insert(&txn).await?;
    txn.commit().await?;

    Ok(to_domain(inserted))
}

/// Move an appointment from `expected` to `next` in one conditional update.
pub async fn update_status(
    db: &DatabaseConnection,
    id: Uuid,
    expected: AppointmentStatus,
    next: AppointmentStatus,
) -> crate::Result<Option<Appointment>> {
    let result = Appointments::update_many()
        .col_expr(appointments::Column::Status, sea_query::Expr::value(next))
        .filter(appointments::Column::Id.eq(id))
        .filter(appointments::Column::Status.eq(expected))
        .exec(db)
        .await?;

    let current = get_by_id(db, id).await?;
    match current {
        Some(appointment) if result.rows_affected == 0 => Err(AppError::conflict(format!(
            "Appointment {id} is now {}",
            appointment.status
        ))),
        other => Ok(other),
    }
}
