use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models::{AppointmentSource, AppointmentStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "app", table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub service_id: Uuid,
    pub stylist_id: Uuid,
    pub appointment_date: Date,
    pub start_time: Time,
    pub duration_minutes: i32,
    pub status: AppointmentStatus,
    pub source: AppointmentSource,
    pub notes: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::staff::Entity",
        from = "Column::StylistId",
        to = "super::staff::Column::Id"
    )]
    Stylist,
}

impl Related<super::staff::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stylist.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
