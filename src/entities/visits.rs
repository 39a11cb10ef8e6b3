use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{PaymentMethod, VisitStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "visits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_phone: String,
    pub customer_name: String,
    pub stylist_id: Option<Uuid>,
    pub status: VisitStatus,
    pub discount_cents: Option<i64>,
    pub tax_cents: Option<i64>,
    pub total_cents: Option<i64>,
    pub paid_cents: Option<i64>,
    pub payment_method: Option<PaymentMethod>,
    pub checked_in_at: DateTime,
    pub completed_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::visit_items::Entity")]
    VisitItems,
}

impl Related<super::visit_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VisitItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
