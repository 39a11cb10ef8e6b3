//! Service catalogue models.

use chrono::NaiveDateTime;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Which customers a service is offered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum GenderRestriction {
    #[sea_orm(string_value = "any")]
    Any,
    #[sea_orm(string_value = "female")]
    Female,
    #[sea_orm(string_value = "male")]
    Male,
}

/// A bookable salon service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: u32,
    pub gender: GenderRestriction,
    pub is_active: bool,
    /// Set when soft-deleted; cleared on restore.
    pub deleted_at: Option<NaiveDateTime>,
}

impl Service {
    /// Active and not soft-deleted.
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.deleted_at.is_none()
    }
}

/// Longest service the catalogue accepts, one full day.
pub const MAX_SERVICE_MINUTES: u32 = 24 * 60;

/// DTO for creating a service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateService {
    pub name: String,
    pub category: String,
    pub price_cents: i64,
    pub duration_minutes: u32,
    pub gender: GenderRestriction,
}

impl CreateService {
    pub fn validate(&self) -> crate::Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Service name is required"));
        }
        if self.price_cents < 0 {
            return Err(AppError::validation("Service price cannot be negative"));
        }
        if self.duration_minutes == 0 {
            return Err(AppError::validation("Service duration must be at least 1 minute"));
        }
        if self.duration_minutes > MAX_SERVICE_MINUTES {
            return Err(AppError::validation(format!(
                "Service duration cannot exceed {MAX_SERVICE_MINUTES} minutes"
            )));
        }
        Ok(())
    }
}

/// DTO for updating a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateService {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price_cents: Option<i64>,
    pub duration_minutes: Option<u32>,
    pub gender: Option<GenderRestriction>,
    pub is_active: Option<bool>,
}

impl UpdateService {
    /// Apply the changes to a service, validating the result.
    pub fn apply(self, service: &mut Service) -> crate::Result<()> {
        let mut updated = service.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(category) = self.category {
            updated.category = category;
        }
        if let Some(price_cents) = self.price_cents {
            updated.price_cents = price_cents;
        }
        if let Some(duration_minutes) = self.duration_minutes {
            updated.duration_minutes = duration_minutes;
        }
        if let Some(gender) = self.gender {
            updated.gender = gender;
        }
        if let Some(is_active) = self.is_active {
            updated.is_active = is_active;
        }

        CreateService {
            name: updated.name.clone(),
            category: updated.category.clone(),
            price_cents: updated.price_cents,
            duration_minutes: updated.duration_minutes,
            gender: updated.gender,
        }
        .validate()?;

        *service = updated;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn haircut() -> Service {
        Service {
            id: Uuid::new_v4(),
            name: "Haircut".to_string(),
            category: "Hair".to_string(),
            price_cents: 2500,
            duration_minutes: 45,
            gender: GenderRestriction::Any,
            is_active: true,
            deleted_at: None,
        }
    }

    #[test]
    fn test_soft_deleted_service_not_bookable() {
        let mut service = haircut();
        assert!(service.is_bookable());

        service.deleted_at = chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0));
        assert!(!service.is_bookable());
    }

    #[test]
    fn test_update_rejects_zero_duration() {
        let mut service = haircut();
        let update = UpdateService {
            duration_minutes: Some(0),
            ..Default::default()
        };
        assert!(update.apply(&mut service).is_err());
        assert_eq!(service.duration_minutes, 45);
    }

    #[test]
    fn test_duration_capped_at_one_day() {
        let mut create = CreateService {
            name: "Marathon".to_string(),
            category: "Hair".to_string(),
            price_cents: 0,
            duration_minutes: MAX_SERVICE_MINUTES,
            gender: GenderRestriction::Any,
        };
        assert!(create.validate().is_ok());
        create.duration_minutes = MAX_SERVICE_MINUTES + 1;
        assert!(create.validate().is_err());
        create.duration_minutes = u32::MAX;
        assert!(create.validate().is_err());

        let mut service = haircut();
        let update = UpdateService {
            duration_minutes: Some(u32::MAX),
            ..Default::default()
        };
        assert!(update.apply(&mut service).is_err());
        assert_eq!(service.duration_minutes, 45);
    }

    #[test]
    fn test_update_applies_fields() {
        let mut service = haircut();
        let update = UpdateService {
            price_cents: Some(3000),
            is_active: Some(false),
            ..Default::default()
        };
        update.apply(&mut service).unwrap();
        assert_eq!(service.price_cents, 3000);
        assert!(!service.is_active);
    }
}
