pub mod billing;
pub mod expenses;
pub mod health;
pub mod metrics;
pub mod payouts;
pub mod rates;
pub mod reports;
