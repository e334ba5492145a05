//! Tuition billing domain entity

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::period::Period;
use crate::domain::status::SettlementStatus;
use crate::domain::DomainResult;

const ENTITY: &str = "TuitionBilling";

/// One monthly tuition invoice for a (student, class) pair.
///
/// `amount` is copied from the class tuition when the invoice is created and
/// never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TuitionBilling {
    pub id: i32,
    pub student_id: i32,
    pub class_id: i32,
    #[schema(value_type = String, example = "2024-06")]
    pub billing_month: Period,
    /// Amount in minor currency units
    pub amount: i64,
    pub status: SettlementStatus,
    pub due_date: NaiveDate,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub invoice_number: String,
    pub created_at: DateTime<Utc>,
}

impl TuitionBilling {
    pub fn new_pending(
        student_id: i32,
        class_id: i32,
        billing_month: Period,
        amount: i64,
        due_date: NaiveDate,
        invoice_number: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            student_id,
            class_id,
            billing_month,
            amount,
            status: SettlementStatus::Pending,
            due_date,
            paid_at: None,
            payment_method: None,
            invoice_number: invoice_number.into(),
            created_at: Utc::now(),
        }
    }

    pub fn mark_paid(
        &mut self,
        payment_method: impl Into<String>,
        paid_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Paid)?;
        self.payment_method = Some(payment_method.into());
        self.paid_at = Some(paid_at);
        Ok(())
    }

    pub fn mark_overdue(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Overdue)?;
        Ok(())
    }

    pub fn cancel(&mut self) -> DomainResult<()> {
        self.status = self.status.transition(ENTITY, SettlementStatus::Cancelled)?;
        Ok(())
    }

    /// Whole days past the due date as of `as_of` (0 when not yet due).
    pub fn days_overdue(&self, as_of: NaiveDate) -> i64 {
        (as_of - self.due_date).num_days().max(0)
    }

    /// Unpaid and past its due date.
    pub fn is_overdue_on(&self, as_of: NaiveDate) -> bool {
        self.status.is_open() && self.due_date < as_of
    }

    /// Counts towards billed totals.
    pub fn is_billable(&self) -> bool {
        self.status != SettlementStatus::Cancelled
    }
}

/// `{prefix}-{YYYYMM}-{seq:04}`, e.g. `INV-202406-0012`.
pub fn format_invoice_number(prefix: &str, period: Period, sequence: u32) -> String {
    format!("{}-{}-{:04}", prefix, period.compact(), sequence)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::errors::DomainError;

    fn sample_billing() -> TuitionBilling {
        TuitionBilling::new_pending(
            1,
            10,
            Period::parse("2024-06").unwrap(),
            450_000,
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            "INV-202406-0001",
        )
    }

    #[test]
    fn new_billing_is_pending() {
        let b = sample_billing();
        assert_eq!(b.status, SettlementStatus::Pending);
        assert!(b.paid_at.is_none());
        assert!(b.is_billable());
    }

    #[test]
    fn mark_paid_records_method_and_time() {
        let mut b = sample_billing();
        let now = Utc::now();
        b.mark_paid("bank_transfer", now).unwrap();
        assert_eq!(b.status, SettlementStatus::Paid);
        assert_eq!(b.payment_method.as_deref(), Some("bank_transfer"));
        assert_eq!(b.paid_at, Some(now));
    }

    #[test]
    fn overdue_billing_can_still_be_paid() {
        let mut b = sample_billing();
        b.mark_overdue().unwrap();
        b.mark_paid("cash", Utc::now()).unwrap();
        assert_eq!(b.status, SettlementStatus::Paid);
    }

    #[test]
    fn paid_billing_cannot_be_cancelled() {
        let mut b = sample_billing();
        b.mark_paid("cash", Utc::now()).unwrap();
        let err = b.cancel().unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(b.status, SettlementStatus::Paid);
    }

    #[test]
    fn days_overdue_counts_whole_days() {
        let b = sample_billing();
        assert_eq!(b.days_overdue(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()), 0);
        assert_eq!(b.days_overdue(NaiveDate::from_ymd_opt(2024, 7, 10).unwrap()), 30);
        assert!(!b.is_overdue_on(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
        assert!(b.is_overdue_on(NaiveDate::from_ymd_opt(2024, 6, 11).unwrap()));
    }

    #[test]
    fn invoice_number_format() {
        let p = Period::parse("2024-06").unwrap();
        assert_eq!(format_invoice_number("INV", p, 12), "INV-202406-0012");
    }
}
