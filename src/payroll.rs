//! Monthly worked hours and commission.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::visit::percent_of;
use crate::models::{AttendanceRecord, Staff, Visit, VisitStatus, YearMonth};
use crate::retry::{RetryPolicy, with_retry};
use crate::store::SalonStore;

/// Payroll figures for one staff member in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub staff_id: Uuid,
    pub month: YearMonth,
    /// Days with both punch-in and punch-out.
    pub days_worked: u32,
    pub total_hours: f64,
    /// Days punched in but never punched out; excluded from hours.
    pub open_days: u32,
    pub visit_count: u32,
    pub commission_base_cents: i64,
    pub commission_rate_percent: f64,
    pub commission_cents: i64,
}

/// Aggregate punch records and completed visits into a summary.
///
/// Soft-deleted records, records outside the month, and visits that are not
/// completed inside the month are ignored regardless of what the caller passes.
pub fn summarize_month(
    staff_id: Uuid,
    month: YearMonth,
    records: &[AttendanceRecord],
    visits: &[Visit],
    rate_percent: f64,
) -> MonthlySummary {
    let mut days = BTreeSet::new();
    let mut total_hours = 0.0;
    let mut open_days = 0;

    for record in records
        .iter()
        .filter(|r| r.staff_id == staff_id && !r.is_deleted() && month.contains(r.work_date))
    {
        match record.work_hours() {
            Some(hours) => {
                days.insert(record.work_date);
                total_hours += hours;
            }
            None => open_days += 1,
        }
    }

    let mut visit_count = 0;
    let mut base = 0;
    for visit in visits.iter().filter(|v| {
        v.status == VisitStatus::Completed && v.completed_at.is_some_and(|at| month.contains(at.date()))
    }) {
        let revenue = visit.service_revenue_for(staff_id);
        if revenue > 0 {
            visit_count += 1;
            base += revenue;
        }
    }

    MonthlySummary {
        staff_id,
        month,
        days_worked: days.len() as u32,
        total_hours,
        open_days,
        visit_count,
        commission_base_cents: base,
        commission_rate_percent: rate_percent,
        commission_cents: percent_of(base, rate_percent),
    }
}

/// Loads attendance and visits through the store and aggregates them.
pub struct PayrollService {
    store: Arc<dyn SalonStore>,
    rate_percent: f64,
    retry: RetryPolicy,
}

impl PayrollService {
    pub fn new(store: Arc<dyn SalonStore>, rate_percent: f64) -> Self {
        Self {
            store,
            rate_percent,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub async fn monthly_summary(&self, staff_id: Uuid, month: YearMonth) -> Result<MonthlySummary> {
        if self.store.get_staff(staff_id).await?.is_none() {
            return Err(AppError::not_found(format!("Staff {staff_id}")));
        }

        let records = with_retry(&self.retry, "list_punch_records", || {
            self.store.list_punch_records(staff_id, month)
        })
        .await?;
        let visits = with_retry(&self.retry, "list_completed_visits", || {
            self.store.list_completed_visits(staff_id, month)
        })
        .await?;

        let summary = summarize_month(staff_id, month, &records, &visits, self.rate_percent);
        info!(
            staff_id = %staff_id,
            month = %month,
            hours = summary.total_hours,
            commission_cents = summary.commission_cents,
            "Monthly summary computed"
        );
        Ok(summary)
    }

    /// Summaries for every active staff member, ordered by name.
    pub async fn all_summaries(&self, month: YearMonth) -> Result<Vec<(Staff, MonthlySummary)>> {
        let staff = with_retry(&self.retry, "list_staff", || self.store.list_staff(true)).await?;
        let mut out = Vec::with_capacity(staff.len());
        for member in staff {
            let summary = self.monthly_summary(member.id, month).await?;
            out.push((member, summary));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, LineItemKind};
    use chrono::{NaiveDate, NaiveDateTime};

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, min, 0).unwrap()
    }

    fn record(staff: Uuid, punch_in: NaiveDateTime, punch_out: Option<NaiveDateTime>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            staff_id: staff,
            work_date: punch_in.date(),
            punch_in,
            punch_out,
            deleted_at: None,
        }
    }

    fn completed_visit(staff: Uuid, price: i64, completed_at: NaiveDateTime) -> Visit {
        let mut visit = Visit::check_in("5551234567".into(), "Mia".into(), Some(staff), completed_at);
        visit.items.push(LineItem {
            kind: LineItemKind::Service,
            ref_id: None,
            name: "Cut".to_string(),
            unit_price_cents: price,
            quantity: 1,
            stylist_id: None,
        });
        visit.status = VisitStatus::Completed;
        visit.completed_at = Some(completed_at);
        visit
    }

    #[test]
    fn test_hours_count_only_closed_days() {
        let staff = Uuid::new_v4();
        let june = YearMonth::new(2025, 6).unwrap();
        let mut deleted = record(staff, ts(2025, 6, 4, 9, 0), Some(ts(2025, 6, 4, 18, 0)));
        deleted.deleted_at = Some(ts(2025, 6, 4, 19, 0));
        let records = vec![
            record(staff, ts(2025, 6, 2, 9, 0), Some(ts(2025, 6, 2, 17, 0))),
            record(staff, ts(2025, 6, 3, 10, 0), Some(ts(2025, 6, 3, 14, 30))),
            record(staff, ts(2025, 6, 5, 9, 0), None),
            deleted,
            record(staff, ts(2025, 5, 31, 9, 0), Some(ts(2025, 5, 31, 17, 0))),
        ];

        let summary = summarize_month(staff, june, &records, &[], 10.0);
        assert_eq!(summary.days_worked, 2);
        assert_eq!(summary.total_hours, 12.5);
        assert_eq!(summary.open_days, 1);
    }

    #[test]
    fn test_commission_excludes_adjacent_months() {
        let staff = Uuid::new_v4();
        let june = YearMonth::new(2025, 6).unwrap();
        let visits = vec![
            completed_visit(staff, 5_000, ts(2025, 5, 31, 19, 0)),
            completed_visit(staff, 4_000, ts(2025, 6, 1, 9, 30)),
            completed_visit(staff, 6_000, ts(2025, 6, 30, 19, 45)),
            completed_visit(staff, 7_000, ts(2025, 7, 1, 9, 0)),
        ];

        let summary = summarize_month(staff, june, &[], &visits, 12.5);
        assert_eq!(summary.visit_count, 2);
        assert_eq!(summary.commission_base_cents, 10_000);
        assert_eq!(summary.commission_cents, 1_250);
    }

    #[test]
    fn test_commission_ignores_unfinished_and_other_staff() {
        let staff = Uuid::new_v4();
        let other = Uuid::new_v4();
        let june = YearMonth::new(2025, 6).unwrap();

        let mut in_progress = completed_visit(staff, 9_000, ts(2025, 6, 10, 12, 0));
        in_progress.status = VisitStatus::ReadyForBilling;
        let visits = vec![
            in_progress,
            completed_visit(other, 3_000, ts(2025, 6, 11, 12, 0)),
            completed_visit(staff, 2_000, ts(2025, 6, 12, 12, 0)),
        ];

        let summary = summarize_month(staff, june, &[], &visits, 10.0);
        assert_eq!(summary.commission_base_cents, 2_000);
        assert_eq!(summary.commission_cents, 200);
    }
}
