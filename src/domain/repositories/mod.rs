//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `InsertOutcome`: result of a uniqueness-guarded insert
//! - `DomainResult`: standard result type for domain operations

use super::billing::BillingRepository;
use super::enrollment::EnrollmentRepository;
use super::expense::ExpenseRepository;
use super::payout::PayoutRepository;
use super::rate::RateRepository;
use super::session::SessionRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Outcome of inserting a row guarded by a unique key.
///
/// A storage-level uniqueness rejection is not an error for batch runs;
/// it means another run got there first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome<T> {
    Inserted(T),
    Duplicate,
}

impl<T> InsertOutcome<T> {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate)
    }

    pub fn inserted(self) -> Option<T> {
        match self {
            InsertOutcome::Inserted(value) => Some(value),
            InsertOutcome::Duplicate => None,
        }
    }
}

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let enrollments = repos.enrollments().find_active(None).await?;
///     let open = repos.billings().find_unpaid_due_before(today).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn enrollments(&self) -> &dyn EnrollmentRepository;
    fn billings(&self) -> &dyn BillingRepository;
    fn rates(&self) -> &dyn RateRepository;
    fn payouts(&self) -> &dyn PayoutRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn expenses(&self) -> &dyn ExpenseRepository;
}
