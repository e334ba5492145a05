//! Application layer: services implementing the financial engine

pub mod services;

use std::sync::Arc;

use crate::domain::RepositoryProvider;
use crate::shared::retry::RetryConfig;

pub use services::{
    AgingClassifier, BillingGenerator, CompensationCalculator, ExpenseService,
    FinancialAggregator, RateService,
};

pub type SharedFinanceServices = Arc<FinanceServices>;

/// All engine services over one repository provider.
pub struct FinanceServices {
    pub rates: RateService,
    pub billing: BillingGenerator,
    pub payouts: CompensationCalculator,
    pub aging: AgingClassifier,
    pub reports: FinancialAggregator,
    pub expenses: ExpenseService,
}

impl FinanceServices {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        invoice_prefix: impl Into<String>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            rates: RateService::new(repos.clone()),
            billing: BillingGenerator::new(repos.clone())
                .with_invoice_prefix(invoice_prefix)
                .with_retry(retry.clone()),
            payouts: CompensationCalculator::new(repos.clone()).with_retry(retry),
            aging: AgingClassifier::new(repos.clone()),
            reports: FinancialAggregator::new(repos.clone()),
            expenses: ExpenseService::new(repos),
        }
    }
}
