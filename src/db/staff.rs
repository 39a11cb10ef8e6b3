//! Staff repository.

use chrono::NaiveDateTime;
use sea_orm::*;
use uuid::Uuid;

use crate::entities::staff;
use crate::models::{CreateStaff, Staff};

pub(crate) fn to_domain(m: staff::Model) -> Staff {
    Staff {
        id: m.id,
        full_name: m.full_name,
        role: m.role,
        phone: m.phone,
        email: m.email,
        is_active: m.is_active,
        created_at: m.created_at,
    }
}

/// List staff ordered by name.
pub async fn list(db: &DatabaseConnection, active_only: bool) -> Result<Vec<Staff>, DbErr> {
    let mut query = staff::Entity::find();
    if active_only {
        query = query.filter(staff::Column::IsActive.eq(true));
    }
    let rows = query.order_by_asc(staff::Column::FullName).all(db).await?;
    Ok(rows.into_iter().map(to_domain).collect())
}

/// Get staff by ID.
pub async fn get_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<Option<Staff>, DbErr> {
    Ok(staff::Entity::find_by_id(id).one(db).await?.map(to_domain))
}

/// Lock the staff row for the rest of the transaction (`SELECT ... FOR UPDATE`).
///
/// Serialises writes that must see each other for the same staff member.
pub async fn lock<C: ConnectionTrait>(txn: &C, id: Uuid) -> Result<Option<Staff>, DbErr> {
    Ok(staff::Entity::find_by_id(id)
        .lock_exclusive()
        .one(txn)
        .await?
        .map(to_domain))
}

/// Create a new staff member with a normalized phone.
pub async fn create(
    db: &DatabaseConnection,
    data: CreateStaff,
    phone: Option<String>,
    at: NaiveDateTime,
) -> Result<Staff, DbErr> {
    let model = staff::ActiveModel {
        id: Set(Uuid::new_v4()),
        full_name: Set(data.full_name),
        role: Set(data.role),
        phone: Set(phone),
        email: Set(data.email),
        is_active: Set(true),
        created_at: Set(at),
    };
    Ok(to_domain(model.insert(db).await?))
}

/// Set whether a staff member is active. `None` if missing.
pub async fn set_active(db: &DatabaseConnection, id: Uuid, active: bool) -> Result<Option<Staff>, DbErr> {
    let Some(existing) = staff::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let mut model: staff::ActiveModel = existing.into();
    model.is_active = Set(active);
    Ok(Some(to_domain(model.update(db).await?)))
}
