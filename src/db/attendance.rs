//! Attendance repository for punch operations and payroll reads.

use chrono::{NaiveDate, NaiveDateTime};
use sea_orm::*;
use uuid::Uuid;

use crate::entities::{attendance_records, prelude::*};
use crate::error::AppError;
use crate::models::{AttendanceRecord, YearMonth};

fn to_domain(m: attendance_records::Model) -> AttendanceRecord {
    AttendanceRecord {
        id: m.id,
        staff_id: m.staff_id,
        work_date: m.work_date,
        punch_in: m.punch_in,
        punch_out: m.punch_out,
        deleted_at: m.deleted_at,
    }
}

/// Get records for a staff member within a month, soft-deleted included.
pub async fn list_for_month(
    db: &DatabaseConnection,
    staff_id: Uuid,
    month: YearMonth,
) -> Result<Vec<AttendanceRecord>, DbErr> {
    let rows = AttendanceRecords::find()
        .filter(attendance_records::Column::StaffId.eq(staff_id))
        .filter(attendance_records::Column::WorkDate.between(month.first_day(), month.last_day()))
        .order_by_asc(attendance_records::Column::WorkDate)
        .order_by_asc(attendance_records::Column::PunchIn)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_domain).collect())
}

async fn find_active_model<C: ConnectionTrait>(
    db: &C,
    staff_id: Uuid,
    date: NaiveDate,
) -> Result<Option<attendance_records::Model>, DbErr> {
    AttendanceRecords::find()
        .filter(attendance_records::Column::StaffId.eq(staff_id))
        .filter(attendance_records::Column::WorkDate.eq(date))
        .filter(attendance_records::Column::DeletedAt.is_null())
        .one(db)
        .await
}

/// Get the non-deleted record for a staff member on a date.
pub async fn find_active(
    db: &DatabaseConnection,
    staff_id: Uuid,
    date: NaiveDate,
) -> Result<Option<AttendanceRecord>, DbErr> {
    Ok(find_active_model(db, staff_id, date).await?.map(to_domain))
}

/// Open the day's record.
///
/// Conflict if a live record exists. The partial unique index on
/// (staff_id, work_date) backs this up against concurrent punches.
pub async fn punch_in(
    db: &DatabaseConnection,
    staff_id: Uuid,
    date: NaiveDate,
    at: NaiveDateTime,
) -> crate::Result<AttendanceRecord> {
    let txn = db.begin().await?;

    if super::staff::lock(&txn, staff_id).await?.is_none() {
        txn.rollback().await?;
        return Err(AppError::not_found(format!("Staff {staff_id}")));
    }

    if let Some(existing) = find_active_model(&txn, staff_id, date).await? {
        txn.rollback().await?;
        return Err(if existing.punch_out.is_none() {
            AppError::conflict(format!("Already punched in on {date}"))
        } else {
            AppError::conflict(format!("Attendance for {date} is already complete"))
        });
    }

    let model = attendance_records::ActiveModel {
        id: Set(Uuid::new_v4()),
        staff_id: Set(staff_id),
        work_date: Set(date),
        punch_in: Set(at),
        punch_out: Set(None),
        deleted_at: Set(None),
    };
    let inserted = model.insert(&txn).await?;
    txn.commit().await?;

    Ok(to_domain(inserted))
}

/// Close the day's open record.
pub async fn punch_out(
    db: &DatabaseConnection,
    staff_id: Uuid,
    date: NaiveDate,
    at: NaiveDateTime,
) -> crate::Result<AttendanceRecord> {
    let txn = db.begin().await?;

    let Some(existing) = find_active_model(&txn, staff_id, date).await? else {
        txn.rollback().await?;
        return Err(AppError::conflict(format!("No punch-in recorded on {date}")));
    };
    if existing.punch_out.is_some() {
        txn.rollback().await?;
        return Err(AppError::conflict(format!("Already punched out on {date}")));
    }
    if at < existing.punch_in {
        txn.rollback().await?;
        return Err(AppError::validation("Punch-out cannot be before punch-in"));
    }

    // Guarded on punch_out IS NULL so a concurrent punch-out cannot be overwritten.
    let result = AttendanceRecords::update_many()
        .col_expr(attendance_records::Column::PunchOut, sea_query::Expr::value(Some(at)))
        .filter(attendance_records::Column::Id.eq(existing.id))
        .filter(attendance_records::Column::PunchOut.is_null())
        .exec(&txn)
        .await?;
    if result.rows_affected == 0 {
        txn.rollback().await?;
        return Err(AppError::conflict(format!("Already punched out on {date}")));
    }
    txn.commit().await?;

    Ok(AttendanceRecord {
        punch_out: Some(at),
        ..to_domain(existing)
    })
}

/// Soft-delete the day's record, freeing the day for a new punch-in.
pub async fn soft_delete(
    db: &DatabaseConnection,
    staff_id: Uuid,
    date: NaiveDate,
    at: NaiveDateTime,
) -> Result<bool, DbErr> {
    let result = AttendanceRecords::update_many()
        .col_expr(attendance_records::Column::DeletedAt, sea_query::Expr::value(Some(at)))
        .filter(attendance_records::Column::StaffId.eq(staff_id))
        .filter(attendance_records::Column::WorkDate.eq(date))
        .filter(attendance_records::Column::DeletedAt.is_null())
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}
