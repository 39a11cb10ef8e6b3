//! Customer repository, keyed by phone.

use chrono::NaiveDateTime;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::entities::{customers, prelude::*};
use crate::models::Customer;

fn to_domain(m: customers::Model) -> Customer {
    Customer {
        phone: m.phone,
        name: m.name,
        email: m.email,
        created_at: m.created_at,
    }
}

/// Find a customer by normalized phone.
pub async fn find<C: ConnectionTrait>(db: &C, phone: &str) -> Result<Option<Customer>, DbErr> {
    Ok(Customers::find_by_id(phone.to_owned()).one(db).await?.map(to_domain))
}

/// Insert or refresh a customer. A missing email keeps the stored one.
///
/// Uses ON CONFLICT on the phone key so concurrent check-ins converge.
pub async fn upsert(
    db: &DatabaseConnection,
    phone: &str,
    name: &str,
    email: Option<&str>,
    at: NaiveDateTime,
) -> Result<Customer, DbErr> {
    let model = customers::ActiveModel {
        phone: Set(phone.to_owned()),
        name: Set(name.to_owned()),
        email: Set(email.map(str::to_owned)),
        created_at: Set(at),
    };

    let mut on_conflict = OnConflict::column(customers::Column::Phone);
    on_conflict.update_column(customers::Column::Name);
    if email.is_some() {
        on_conflict.update_column(customers::Column::Email);
    }

    Customers::insert(model)
        .on_conflict(on_conflict.to_owned())
        .exec(db)
        .await?;

    find(db, phone)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("customer {phone}")))
}
