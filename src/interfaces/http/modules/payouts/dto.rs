use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CalculatePayRequest {
    /// Month to pay, `YYYY-MM`
    #[validate(length(equal = 7, message = "payment_month must be YYYY-MM"))]
    pub payment_month: String,
}
