//! Rate DTOs

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{RateChange, RateType};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RatesQuery {
    /// Full history for one teacher; omitted lists every active rate
    pub teacher_id: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ResolveRateQuery {
    pub teacher_id: i32,
    /// Defaults to today
    pub on_date: Option<NaiveDate>,
    pub rate_type: Option<RateType>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRateRequest {
    #[validate(range(min = 1, message = "teacher_id must be positive"))]
    pub teacher_id: i32,
    pub rate_type: RateType,
    /// Minor currency units
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: i64,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRateRequest {
    #[validate(range(min = 1, message = "amount must be positive"))]
    pub amount: Option<i64>,
    pub rate_type: Option<RateType>,
    pub effective_date: Option<NaiveDate>,
}

impl From<UpdateRateRequest> for RateChange {
    fn from(req: UpdateRateRequest) -> Self {
        RateChange {
            amount: req.amount,
            rate_type: req.rate_type,
            effective_date: req.effective_date,
        }
    }
}
