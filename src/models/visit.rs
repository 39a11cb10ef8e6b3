//! Walk-in visits: check-in through billing.

use chrono::NaiveDateTime;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Visit progression. Each step moves forward by exactly one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisitStatus {
    #[sea_orm(string_value = "CHECKED_IN")]
    CheckedIn,
    #[sea_orm(string_value = "IN_SERVICE")]
    InService,
    #[sea_orm(string_value = "READY_FOR_BILLING")]
    ReadyForBilling,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
}

impl VisitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckedIn => "CHECKED_IN",
            Self::InService => "IN_SERVICE",
            Self::ReadyForBilling => "READY_FOR_BILLING",
            Self::Completed => "COMPLETED",
        }
    }

    pub fn next(&self) -> Option<VisitStatus> {
        match self {
            Self::CheckedIn => Some(Self::InService),
            Self::InService => Some(Self::ReadyForBilling),
            Self::ReadyForBilling => Some(Self::Completed),
            Self::Completed => None,
        }
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum LineItemKind {
    #[sea_orm(string_value = "service")]
    Service,
    #[sea_orm(string_value = "product")]
    Product,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "card")]
    Card,
    #[sea_orm(string_value = "transfer")]
    Transfer,
    #[sea_orm(string_value = "other")]
    Other,
}

/// A billed service or product on a visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    /// Catalogue reference (service or product id), if any.
    pub ref_id: Option<Uuid>,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    /// Staff credited for this line; falls back to the visit's stylist.
    pub stylist_id: Option<Uuid>,
}

impl LineItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Payment details entered at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub discount_cents: i64,
    pub tax_percent: f64,
    pub paid_cents: i64,
    pub method: PaymentMethod,
}

/// Finalized payment stored on a completed visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub method: PaymentMethod,
}

/// Computed bill totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub id: Uuid,
    pub customer_phone: String,
    pub customer_name: String,
    pub stylist_id: Option<Uuid>,
    pub status: VisitStatus,
    pub items: Vec<LineItem>,
    pub payment: Option<Payment>,
    pub checked_in_at: NaiveDateTime,
    pub completed_at: Option<NaiveDateTime>,
}

impl Visit {
    /// Start a visit in `CHECKED_IN`.
    pub fn check_in(
        customer_phone: String,
        customer_name: String,
        stylist_id: Option<Uuid>,
        at: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_phone,
            customer_name,
            stylist_id,
            status: VisitStatus::CheckedIn,
            items: Vec::new(),
            payment: None,
            checked_in_at: at,
            completed_at: None,
        }
    }

    /// Move one stage forward. Completion goes through [`Visit::checkout`].
    pub fn advance(&mut self) -> crate::Result<VisitStatus> {
        match self.status.next() {
            Some(VisitStatus::Completed) | None => Err(AppError::invalid_transition(
                self.status,
                "next stage (use checkout to complete)",
            )),
            Some(next) => {
                self.status = next;
                Ok(next)
            }
        }
    }

    pub fn add_item(&mut self, item: LineItem) -> crate::Result<()> {
        if self.status == VisitStatus::Completed {
            return Err(AppError::conflict("Cannot add items to a completed visit"));
        }
        if item.quantity == 0 {
            return Err(AppError::validation("Line item quantity must be at least 1"));
        }
        if item.unit_price_cents < 0 {
            return Err(AppError::validation("Line item price cannot be negative"));
        }
        self.items.push(item);
        Ok(())
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.items.iter().map(LineItem::line_total_cents).sum()
    }

    /// Compute totals without changing the visit.
    pub fn bill(&self, request: &PaymentRequest) -> crate::Result<Bill> {
        let subtotal = self.subtotal_cents();
        if request.discount_cents < 0 || request.discount_cents > subtotal {
            return Err(AppError::validation("Discount must be between zero and the subtotal"));
        }
        if !(0.0..=100.0).contains(&request.tax_percent) {
            return Err(AppError::validation("Tax must be between 0 and 100 percent"));
        }

        let taxable = subtotal - request.discount_cents;
        let tax = percent_of(taxable, request.tax_percent);
        Ok(Bill {
            subtotal_cents: subtotal,
            discount_cents: request.discount_cents,
            tax_cents: tax,
            total_cents: taxable + tax,
        })
    }

    /// Finalize payment, moving `READY_FOR_BILLING -> COMPLETED`.
    pub fn checkout(&mut self, request: &PaymentRequest, at: NaiveDateTime) -> crate::Result<Bill> {
        if self.status != VisitStatus::ReadyForBilling {
            return Err(AppError::invalid_transition(self.status, VisitStatus::Completed));
        }
        if self.items.is_empty() {
            return Err(AppError::validation("Cannot check out a visit with no items"));
        }

        let bill = self.bill(request)?;
        if request.paid_cents < bill.total_cents {
            return Err(AppError::validation(format!(
                "Paid amount {} is less than total {}",
                request.paid_cents, bill.total_cents
            )));
        }

        self.payment = Some(Payment {
            discount_cents: bill.discount_cents,
            tax_cents: bill.tax_cents,
            total_cents: bill.total_cents,
            paid_cents: request.paid_cents,
            method: request.method,
        });
        self.status = VisitStatus::Completed;
        self.completed_at = Some(at);
        Ok(bill)
    }

    /// Same stage and item count as `other`. Visits only grow items and only
    /// move forward, so a match means nothing was written in between.
    pub fn same_revision(&self, other: &Visit) -> bool {
        self.status == other.status && self.items.len() == other.items.len()
    }

    /// Whether the staff member is credited anywhere on this visit.
    pub fn involves(&self, staff_id: Uuid) -> bool {
        self.stylist_id == Some(staff_id) || self.items.iter().any(|item| item.stylist_id == Some(staff_id))
    }

    /// Service revenue credited to a staff member on this visit.
    pub fn service_revenue_for(&self, staff_id: Uuid) -> i64 {
        self.items
            .iter()
            .filter(|item| item.kind == LineItemKind::Service)
            .filter(|item| item.stylist_id.or(self.stylist_id) == Some(staff_id))
            .map(LineItem::line_total_cents)
            .sum()
    }
}

/// `amount * percent / 100`, rounded half away from zero.
pub fn percent_of(amount_cents: i64, percent: f64) -> i64 {
    (amount_cents as f64 * percent / 100.0).round() as i64
}
