//! Tuition billing repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::TuitionBilling;
use crate::domain::period::{Period, PeriodRange};
use crate::domain::repositories::InsertOutcome;
use crate::domain::status::SettlementStatus;
use crate::domain::DomainResult;

#[async_trait]
pub trait BillingRepository: Send + Sync {
    async fn exists(&self, student_id: i32, class_id: i32, month: Period) -> DomainResult<bool>;

    /// Insert a new billing. A row already present for
    /// (student_id, class_id, billing_month) yields `InsertOutcome::Duplicate`.
    async fn insert(&self, billing: TuitionBilling) -> DomainResult<InsertOutcome<TuitionBilling>>;

    /// Allocate the next invoice sequence number for a month (starts at 1).
    async fn next_invoice_sequence(&self, month: Period) -> DomainResult<u32>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TuitionBilling>>;

    /// Persist status, paid_at and payment_method, but only while the stored
    /// status is still `from`. A row that moved on in the meantime is left
    /// untouched and yields `InvalidTransition` from its current status.
    /// Amount and keys are immutable.
    async fn update_status(&self, billing: &TuitionBilling, from: SettlementStatus) -> DomainResult<()>;

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TuitionBilling>>;

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TuitionBilling>>;

    /// Paid billings whose `paid_at` date lies in `start..=end`.
    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TuitionBilling>>;

    /// Pending or overdue billings with `due_date < as_of`.
    async fn find_unpaid_due_before(&self, as_of: NaiveDate) -> DomainResult<Vec<TuitionBilling>>;
}
