//! Service catalogue repository.

use chrono::NaiveDateTime;
use sea_orm::*;
use uuid::Uuid;

use crate::entities::{prelude::*, services};
use crate::models::{CreateService, Service, UpdateService};

/// Validated durations always fit the `integer` column.
pub(crate) fn minutes_column(minutes: u32) -> Result<i32, DbErr> {
    i32::try_from(minutes).map_err(|_| DbErr::Custom(format!("Duration out of range: {minutes} minutes")))
}

pub(crate) fn to_domain(m: services::Model) -> Service {
    Service {
        id: m.id,
        name: m.name,
        category: m.category,
        price_cents: m.price_cents,
        duration_minutes: m.duration_minutes.max(0) as u32,
        gender: m.gender,
        is_active: m.is_active,
        deleted_at: m.deleted_at,
    }
}

/// List services ordered by category and name.
pub async fn list_all(db: &DatabaseConnection, include_deleted: bool) -> Result<Vec<Service>, DbErr> {
    let mut query = Services::find();
    if !include_deleted {
        query = query.filter(services::Column::DeletedAt.is_null());
    }

    let rows = query
        .order_by_asc(services::Column::Category)
        .order_by_asc(services::Column::Name)
        .all(db)
        .await?;
    Ok(rows.into_iter().map(to_domain).collect())
}

/// Get service by ID, including soft-deleted ones.
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Service>, DbErr> {
    Ok(Services::find_by_id(id).one(db).await?.map(to_domain))
}

/// Create a new service.
pub async fn create(db: &DatabaseConnection, data: CreateService) -> Result<Service, DbErr> {
    let model = services::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(data.name),
        category: Set(data.category),
        price_cents: Set(data.price_cents),
        duration_minutes: Set(minutes_column(data.duration_minutes)?),
        gender: Set(data.gender),
        is_active: Set(true),
        deleted_at: Set(None),
    };
    Ok(to_domain(model.insert(db).await?))
}

/// Update an existing service with already-validated values.
pub async fn update(db: &DatabaseConnection, service: &Service) -> Result<Option<Service>, DbErr> {
    let Some(existing) = Services::find_by_id(service.id).one(db).await? else {
        return Ok(None);
    };

    let mut active: services::ActiveModel = existing.into();
    active.name = Set(service.name.clone());
    active.category = Set(service.category.clone());
    active.price_cents = Set(service.price_cents);
    active.duration_minutes = Set(minutes_column(service.duration_minutes)?);
    active.gender = Set(service.gender);
    active.is_active = Set(service.is_active);

    Ok(Some(to_domain(active.update(db).await?)))
}

/// Soft delete (`Some`) or restore (`None`) a service.
pub async fn set_deleted(db: &DatabaseConnection, id: Uuid, deleted_at: Option<NaiveDateTime>) -> Result<bool, DbErr> {
    let result = Services::update_many()
        .col_expr(services::Column::DeletedAt, sea_query::Expr::value(deleted_at))
        .filter(services::Column::Id.eq(id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Apply a partial update, validating the merged result first.
pub async fn patch(db: &DatabaseConnection, id: Uuid, data: UpdateService) -> crate::Result<Option<Service>> {
    let Some(mut service) = get_by_id(db, id).await? else {
        return Ok(None);
    };
    data.apply(&mut service)?;
    Ok(update(db, &service).await?)
}
