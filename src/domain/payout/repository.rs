//! Tutor payment repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::TutorPayment;
use crate::domain::period::{Period, PeriodRange};
use crate::domain::repositories::InsertOutcome;
use crate::domain::status::SettlementStatus;
use crate::domain::DomainResult;

#[async_trait]
pub trait PayoutRepository: Send + Sync {
    async fn exists(&self, teacher_id: i32, month: Period) -> DomainResult<bool>;

    /// Insert a payout; an existing (teacher_id, payment_month) row yields `Duplicate`.
    async fn insert(&self, payment: TutorPayment) -> DomainResult<InsertOutcome<TutorPayment>>;

    async fn find_by_id(&self, id: i32) -> DomainResult<Option<TutorPayment>>;

    /// Persist status, paid_at and payment_method, but only while the stored
    /// status is still `from`. A row that moved on in the meantime is left
    /// untouched and yields `InvalidTransition` from its current status.
    /// Amount and keys are immutable.
    async fn update_status(&self, payment: &TutorPayment, from: SettlementStatus) -> DomainResult<()>;

    async fn find_by_month(&self, month: Period) -> DomainResult<Vec<TutorPayment>>;

    async fn find_in_range(&self, range: PeriodRange) -> DomainResult<Vec<TutorPayment>>;

    /// Paid payouts whose `paid_at` date lies in `start..=end`.
    async fn find_paid_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> DomainResult<Vec<TutorPayment>>;

    /// Number of payouts computed with the given rate.
    async fn count_by_rate(&self, rate_id: i32) -> DomainResult<u64>;
}
