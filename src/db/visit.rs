//! Visit repository: visits with their line items.

use chrono::NaiveTime;
use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::{prelude::*, visit_items, visits};
use crate::error::AppError;
use crate::models::{LineItem, Payment, Visit, VisitStatus, YearMonth};

fn to_domain(m: visits::Model, items: Vec<visit_items::Model>) -> Visit {
    let payment = match (m.total_cents, m.payment_method) {
        (Some(total_cents), Some(method)) => Some(Payment {
            discount_cents: m.discount_cents.unwrap_or_default(),
            tax_cents: m.tax_cents.unwrap_or_default(),
            total_cents,
            paid_cents: m.paid_cents.unwrap_or(total_cents),
            method,
        }),
        _ => None,
    };

    Visit {
        id: m.id,
        customer_phone: m.customer_phone,
        customer_name: m.customer_name,
        stylist_id: m.stylist_id,
        status: m.status,
        items: items
            .into_iter()
            .map(|i| LineItem {
                kind: i.kind,
                ref_id: i.ref_id,
                name: i.name,
                unit_price_cents: i.unit_price_cents,
                quantity: i.quantity.max(0) as u32,
                stylist_id: i.stylist_id,
            })
            .collect(),
        payment,
        checked_in_at: m.checked_in_at,
        completed_at: m.completed_at,
    }
}

fn to_active(visit: &Visit) -> visits::ActiveModel {
    let payment = visit.payment.as_ref();
    visits::ActiveModel {
        id: Set(visit.id),
        customer_phone: Set(visit.customer_phone.clone()),
        customer_name: Set(visit.customer_name.clone()),
        stylist_id: Set(visit.stylist_id),
        status: Set(visit.status),
        discount_cents: Set(payment.map(|p| p.discount_cents)),
        tax_cents: Set(payment.map(|p| p.tax_cents)),
        total_cents: Set(payment.map(|p| p.total_cents)),
        paid_cents: Set(payment.map(|p| p.paid_cents)),
        payment_method: Set(payment.map(|p| p.method)),
        checked_in_at: Set(visit.checked_in_at),
        completed_at: Set(visit.completed_at),
    }
}

async fn insert_items<C: ConnectionTrait>(db: &C, visit: &Visit) -> Result<(), DbErr> {
    if visit.items.is_empty() {
        return Ok(());
    }

    let models = visit.items.iter().enumerate().map(|(position, item)| visit_items::ActiveModel {
        id: Set(Uuid::new_v4()),
        visit_id: Set(visit.id),
        position: Set(position as i32),
        kind: Set(item.kind),
        ref_id: Set(item.ref_id),
        name: Set(item.name.clone()),
        unit_price_cents: Set(item.unit_price_cents),
        quantity: Set(item.quantity as i32),
        stylist_id: Set(item.stylist_id),
    });
    VisitItems::insert_many(models).exec(db).await?;
    Ok(())
}

/// Insert a new visit and its items.
pub async fn insert(db: &DatabaseConnection, visit: &Visit) -> Result<(), DbErr> {
    let txn = db.begin().await?;
    to_active(visit).insert(&txn).await?;
    insert_items(&txn, visit).await?;
    txn.commit().await
}

/// Get a visit with its items.
pub async fn get_by_id(db: &DatabaseConnection, id: Uuid) -> Result<Option<Visit>, DbErr> {
    let Some(model) = Visits::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    let items = VisitItems::find()
        .filter(visit_items::Column::VisitId.eq(id))
        .order_by_asc(visit_items::Column::Position)
        .all(db)
        .await?;
    Ok(Some(to_domain(model, items)))
}

/// Overwrite a visit loaded as `prior` and replace its items.
///
/// The visit row is locked for the transaction and must still match
/// `prior`'s stage and item count.
pub async fn save(db: &DatabaseConnection, prior: &Visit, visit: &Visit) -> crate::Result<()> {
    let txn = db.begin().await?;
    let Some(stored) = Visits::find_by_id(visit.id).lock_exclusive().one(&txn).await? else {
        txn.rollback().await?;
        return Err(AppError::not_found(format!("Visit {}", visit.id)));
    };
    let stored_items = VisitItems::find()
        .filter(visit_items::Column::VisitId.eq(visit.id))
        .count(&txn)
        .await?;
    if stored.status != prior.status || stored_items != prior.items.len() as u64 {
        txn.rollback().await?;
        return Err(AppError::conflict(format!(
            "Visit {} was changed by another session",
            visit.id
        )));
    }

    to_active(visit).update(&txn).await?;
    VisitItems::delete_many()
        .filter(visit_items::Column::VisitId.eq(visit.id))
        .exec(&txn)
        .await?;
    insert_items(&txn, visit).await?;
    txn.commit().await?;
    Ok(())
}

/// Completed visits whose completion falls inside the month.
pub async fn list_completed_for_month(db: &DatabaseConnection, month: YearMonth) -> Result<Vec<Visit>, DbErr> {
    let start = month.first_day().and_time(NaiveTime::MIN);
    let end = month.next().first_day().and_time(NaiveTime::MIN);

    let rows = Visits::find()
        .filter(visits::Column::Status.eq(VisitStatus::Completed))
        .filter(visits::Column::CompletedAt.gte(start))
        .filter(visits::Column::CompletedAt.lt(end))
        .order_by_asc(visits::Column::CompletedAt)
        .all(db)
        .await?;

    let ids: Vec<Uuid> = rows.iter().map(|v| v.id).collect();
    let mut items: HashMap<Uuid, Vec<visit_items::Model>> = HashMap::new();
    if !ids.is_empty() {
        for item in VisitItems::find()
            .filter(visit_items::Column::VisitId.is_in(ids))
            .order_by_asc(visit_items::Column::Position)
            .all(db)
            .await?
        {
            items.entry(item.visit_id).or_default().push(item);
        }
    }

    Ok(rows
        .into_iter()
        .map(|visit| {
            let own = items.remove(&visit.id).unwrap_or_default();
            to_domain(visit, own)
        })
        .collect())
}
