//! Expense aggregate
//!
//! One-off and recurring expenses plus their categories. Recurring expenses
//! are expanded into occurrences on demand and never materialized.

pub mod model;
pub mod repository;

pub use model::{CategoryType, Expense, ExpenseCategory, RecurringInterval};
pub use repository::ExpenseRepository;
