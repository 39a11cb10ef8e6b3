//! Walk-in visit flow: check-in, service, billing.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::clock::Clock;
use crate::error::{AppError, Result};
use crate::models::{Bill, LineItem, LineItemKind, PaymentRequest, Visit, VisitStatus, normalize_phone};
use crate::store::SalonStore;

pub struct VisitService {
    store: Arc<dyn SalonStore>,
    clock: Arc<dyn Clock>,
}

impl VisitService {
    pub fn new(store: Arc<dyn SalonStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Check a customer in, creating the customer record if the phone is new.
    ///
    /// A blank name is allowed for returning customers and resolves to the
    /// name on file.
    pub async fn check_in(&self, phone: &str, name: &str, stylist_id: Option<Uuid>) -> Result<Visit> {
        let phone = normalize_phone(phone)?;
        let now = self.clock.now();

        let name = match name.trim() {
            "" => self
                .store
                .find_customer(&phone)
                .await?
                .map(|customer| customer.name)
                .ok_or_else(|| AppError::validation("Customer name is required"))?,
            name => {
                self.store.upsert_customer(&phone, name, None, now).await?;
                name.to_string()
            }
        };
        let visit = Visit::check_in(phone, name, stylist_id, now);
        self.store.create_visit(&visit).await?;

        info!(visit_id = %visit.id, customer = %visit.customer_phone, "Customer checked in");
        Ok(visit)
    }

    /// Add a catalogue service to the visit at its current price.
    pub async fn add_service(&self, visit_id: Uuid, service_id: Uuid, stylist_id: Option<Uuid>) -> Result<Visit> {
        let service = self
            .store
            .get_service(service_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Service {service_id}")))?;
        if !service.is_bookable() {
            return Err(AppError::validation(format!("Service '{}' is not available", service.name)));
        }

        self.add_item(
            visit_id,
            LineItem {
                kind: LineItemKind::Service,
                ref_id: Some(service.id),
                name: service.name,
                unit_price_cents: service.price_cents,
                quantity: 1,
                stylist_id,
            },
        )
        .await
    }

    pub async fn add_item(&self, visit_id: Uuid, item: LineItem) -> Result<Visit> {
        let prior = self.load(visit_id).await?;
        let mut visit = prior.clone();
        visit.add_item(item)?;
        self.store.save_visit(&prior, &visit).await?;
        Ok(visit)
    }

    pub async fn advance(&self, visit_id: Uuid) -> Result<VisitStatus> {
        let prior = self.load(visit_id).await?;
        let mut visit = prior.clone();
        let status = visit.advance()?;
        self.store.save_visit(&prior, &visit).await?;
        info!(visit_id = %visit_id, status = %status, "Visit advanced");
        Ok(status)
    }

    /// Finalize payment and complete the visit.
    pub async fn checkout(&self, visit_id: Uuid, payment: &PaymentRequest) -> Result<Bill> {
        let prior = self.load(visit_id).await?;
        let mut visit = prior.clone();
        let bill = visit.checkout(payment, self.clock.now())?;
        self.store.save_visit(&prior, &visit).await?;
        info!(visit_id = %visit_id, total_cents = bill.total_cents, "Visit checked out");
        Ok(bill)
    }

    async fn load(&self, visit_id: Uuid) -> Result<Visit> {
        self.store
            .get_visit(visit_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Visit {visit_id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::PaymentMethod;
    use crate::store::{DEMO_SERVICE_ID, DEMO_STYLIST_ID, MemoryStore};
    use chrono::NaiveDate;

    fn setup() -> (VisitService, Arc<MemoryStore>) {
        let now = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap().and_hms_opt(10, 0, 0).unwrap();
        let store = Arc::new(MemoryStore::with_demo_catalogue(now));
        (VisitService::new(store.clone(), Arc::new(FixedClock::new(now))), store)
    }

    #[tokio::test]
    async fn test_returning_customer_checks_in_by_phone() {
        let (service, _store) = setup();
        assert!(matches!(
            service.check_in("555-888-0101", "  ", None).await,
            Err(AppError::Validation(_))
        ));

        service.check_in("555-888-0101", "Noor Haddad", None).await.unwrap();
        let again = service.check_in("(555) 888 0101", "", Some(DEMO_STYLIST_ID)).await.unwrap();
        assert_eq!(again.customer_name, "Noor Haddad");
        assert_eq!(again.customer_phone, "5558880101");
    }

    #[tokio::test]
    async fn test_checkout_then_late_item_is_rejected() {
        let (service, store) = setup();
        let visit = service.check_in("555-888-0202", "Ravi Das", Some(DEMO_STYLIST_ID)).await.unwrap();
        service.add_service(visit.id, DEMO_SERVICE_ID, None).await.unwrap();
        service.advance(visit.id).await.unwrap();
        service.advance(visit.id).await.unwrap();

        let payment = PaymentRequest {
            discount_cents: 0,
            tax_percent: 0.0,
            paid_cents: 4_500,
            method: PaymentMethod::Card,
        };
        let bill = service.checkout(visit.id, &payment).await.unwrap();
        assert_eq!(bill.total_cents, 4_500);

        assert!(service.add_service(visit.id, DEMO_SERVICE_ID, None).await.is_err());
        let stored = store.get_visit(visit.id).await.unwrap().unwrap();
        assert_eq!(stored.status, VisitStatus::Completed);
        assert_eq!(stored.items.len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_service_cannot_be_added() {
        let (service, store) = setup();
        let visit = service.check_in("555-888-0303", "Ivy Tran", None).await.unwrap();
        let deleted_at = NaiveDate::from_ymd_opt(2025, 6, 10).and_then(|d| d.and_hms_opt(9, 0, 0));
        store.set_service_deleted(DEMO_SERVICE_ID, deleted_at).await.unwrap();
        assert!(matches!(
            service.add_service(visit.id, DEMO_SERVICE_ID, None).await,
            Err(AppError::Validation(_))
        ));
    }
}
