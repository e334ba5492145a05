//! Billing DTOs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GenerateBillingRequest {
    /// Month to bill, `YYYY-MM`
    #[validate(length(equal = 7, message = "billing_month must be YYYY-MM"))]
    pub billing_month: String,
    pub due_date: Option<NaiveDate>,
    /// Restrict the run to these classes
    pub class_ids: Option<Vec<i32>>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SweepOverdueResponse {
    pub as_of: NaiveDate,
    pub updated: u32,
}

/// `?as_of=YYYY-MM-DD`
#[derive(Debug, Deserialize, IntoParams)]
pub struct AsOfQuery {
    /// Defaults to today
    pub as_of: Option<NaiveDate>,
}
