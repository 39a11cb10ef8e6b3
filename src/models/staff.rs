//! Staff DTOs and models.

use chrono::NaiveDateTime;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    #[sea_orm(string_value = "stylist")]
    Stylist,
    #[sea_orm(string_value = "receptionist")]
    Receptionist,
    #[sea_orm(string_value = "manager")]
    Manager,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stylist => "stylist",
            Self::Receptionist => "receptionist",
            Self::Manager => "manager",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stylist" => Ok(Self::Stylist),
            "receptionist" => Ok(Self::Receptionist),
            "manager" => Ok(Self::Manager),
            other => Err(AppError::validation(format!("Unknown staff role '{other}'"))),
        }
    }
}

/// A salon employee. Never hard-deleted; deactivated instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Staff {
    pub id: Uuid,
    pub full_name: String,
    pub role: StaffRole,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

impl Staff {
    /// Whether customers can be booked with this staff member.
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.role == StaffRole::Stylist
    }
}

/// DTO for creating a staff member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStaff {
    pub full_name: String,
    pub role: StaffRole,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CreateStaff {
    pub fn validate(&self) -> crate::Result<()> {
        if self.full_name.trim().is_empty() {
            return Err(AppError::validation("Staff name is required"));
        }
        if let Some(phone) = &self.phone {
            super::normalize_phone(phone)?;
        }
        Ok(())
    }
}
