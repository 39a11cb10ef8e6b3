use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::GenderRestriction;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: i32,
    pub gender: GenderRestriction,
    pub is_active: bool,
    /// Soft delete marker
    pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
