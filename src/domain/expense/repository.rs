//! Expense repository interface

use async_trait::async_trait;
use chrono::NaiveDate;

use super::model::{Expense, ExpenseCategory};
use crate::domain::DomainResult;

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn insert(&self, expense: Expense) -> DomainResult<Expense>;

    /// One-off expenses dated within `start..=end` plus every recurring
    /// expense anchored on or before `end`.
    async fn find_relevant(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<Expense>>;

    async fn find_all(&self) -> DomainResult<Vec<Expense>>;

    async fn count_by_category(&self, category_id: i32) -> DomainResult<u64>;

    // ── Categories ─────────────────────────────────────────────

    async fn insert_category(&self, category: ExpenseCategory) -> DomainResult<ExpenseCategory>;

    async fn find_category(&self, id: i32) -> DomainResult<Option<ExpenseCategory>>;

    async fn find_categories(&self) -> DomainResult<Vec<ExpenseCategory>>;

    async fn delete_category(&self, id: i32) -> DomainResult<()>;
}
