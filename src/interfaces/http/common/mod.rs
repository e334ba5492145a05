//! Shared HTTP types: response envelope, error mapping, common params

pub mod validated_json;

pub use validated_json::ValidatedJson;

use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::shared::errors::DomainError;

/// Standard response envelope
///
/// Success: `{"success": true, "data": {...}}`,
/// failure: `{"success": false, "data": null, "error": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Empty payload for operations without return data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EmptyData {}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Conflict(_)
        | DomainError::RateInUse { .. }
        | DomainError::CategoryInUse { .. } => StatusCode::CONFLICT,
        DomainError::InvalidTransition { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Map a domain error onto its HTTP status and envelope.
pub fn domain_error(err: DomainError) -> ApiError {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err, "Request failed");
    }
    (status, Json(ApiResponse::error(err.to_string())))
}

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::success(data)))
}

/// `?month=YYYY-MM`
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct MonthQuery {
    /// Month key, `YYYY-MM`
    pub month: String,
}

/// `?from=YYYY-MM&to=YYYY-MM`, both inclusive
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PeriodRangeQuery {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct MarkPaidRequest {
    #[validate(length(min = 1, max = 50, message = "payment method is required"))]
    pub payment_method: String,
    /// Defaults to now
    pub paid_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            status_for(&DomainError::validation("bad month")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&DomainError::NotFound {
                entity: "TuitionBilling",
                field: "id",
                value: "9".into(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&DomainError::RateInUse {
                rate_id: 1,
                usage_count: 2,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&DomainError::InvalidTransition {
                entity: "TuitionBilling",
                from: "paid".into(),
                to: "cancelled".into(),
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&DomainError::Database("disk I/O error".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn envelope_skips_error_field_on_success() {
        let body = serde_json::to_value(ApiResponse::success(3)).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": 3}));

        let body = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"success": false, "data": null, "error": "nope"})
        );
    }
}
