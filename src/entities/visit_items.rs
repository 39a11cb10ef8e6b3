use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::LineItemKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "visit_items")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub visit_id: Uuid,
    pub position: i32,
    pub kind: LineItemKind,
    pub ref_id: Option<Uuid>,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i32,
    pub stylist_id: Option<Uuid>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::visits::Entity",
        from = "Column::VisitId",
        to = "super::visits::Column::Id",
        on_delete = "Cascade"
    )]
    Visit,
}

impl Related<super::visits::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Visit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
