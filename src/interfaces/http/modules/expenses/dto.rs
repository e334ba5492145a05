use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::{CategoryType, RecurringInterval};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordExpenseRequest {
    pub category_id: i32,
    /// Minor currency units
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
    /// Anchor date; recurring expenses repeat on this day of month
    pub expense_date: NaiveDate,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub recurring_interval: Option<RecurringInterval>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100, message = "category name is required"))]
    pub name: String,
    pub category_type: CategoryType,
}
