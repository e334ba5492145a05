pub mod aggregator;
pub mod aging;
pub mod billing_generator;
pub mod compensation;
pub mod expenses;
pub mod rates;

pub use aggregator::{
    CategoryTotal, CollectionRate, ExpenseBreakdown, FinancialAggregator, MonthlyCashFlow, Profitability,
    ProjectedRevenue,
};
pub use aging::{AgedBilling, AgingBucket, AgingClassifier, AgingSummary, BucketSummary};
pub use billing_generator::{BillingGenerator, DEFAULT_INVOICE_PREFIX};
pub use compensation::CompensationCalculator;
pub use expenses::ExpenseService;
pub use rates::RateService;
