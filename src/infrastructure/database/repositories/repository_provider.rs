//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::{
    BillingRepository, EnrollmentRepository, ExpenseRepository, PayoutRepository,
    RateRepository, RepositoryProvider, SessionRepository,
};

use super::billing_repository::SeaOrmBillingRepository;
use super::enrollment_repository::SeaOrmEnrollmentRepository;
use super::expense_repository::SeaOrmExpenseRepository;
use super::payout_repository::SeaOrmPayoutRepository;
use super::rate_repository::SeaOrmRateRepository;
use super::session_repository::SeaOrmSessionRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let open = repos.billings().find_unpaid_due_before(today).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    enrollments: SeaOrmEnrollmentRepository,
    billings: SeaOrmBillingRepository,
    rates: SeaOrmRateRepository,
    payouts: SeaOrmPayoutRepository,
    sessions: SeaOrmSessionRepository,
    expenses: SeaOrmExpenseRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            enrollments: SeaOrmEnrollmentRepository::new(db.clone()),
            billings: SeaOrmBillingRepository::new(db.clone()),
            rates: SeaOrmRateRepository::new(db.clone()),
            payouts: SeaOrmPayoutRepository::new(db.clone()),
            sessions: SeaOrmSessionRepository::new(db.clone()),
            expenses: SeaOrmExpenseRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn enrollments(&self) -> &dyn EnrollmentRepository {
        &self.enrollments
    }

    fn billings(&self) -> &dyn BillingRepository {
        &self.billings
    }

    fn rates(&self) -> &dyn RateRepository {
        &self.rates
    }

    fn payouts(&self) -> &dyn PayoutRepository {
        &self.payouts
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn expenses(&self) -> &dyn ExpenseRepository {
        &self.expenses
    }
}
