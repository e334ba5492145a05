//! Tutor payout REST handlers

use axum::extract::{Path, Query, State};
use chrono::Utc;

use super::dto::CalculatePayRequest;
use crate::application::SharedFinanceServices;
use crate::domain::{BatchResult, TutorPayment};
use crate::interfaces::http::common::{
    domain_error, ok, ApiResponse, ApiResult, MarkPaidRequest, MonthQuery, ValidatedJson,
};

#[utoipa::path(
    post,
    path = "/api/v1/payouts/calculate",
    tag = "Payouts",
    request_body = CalculatePayRequest,
    responses(
        (status = 200, description = "Run summary", body = ApiResponse<BatchResult>),
        (status = 400, description = "Malformed month")
    )
)]
pub async fn calculate_pay(
    State(services): State<SharedFinanceServices>,
    ValidatedJson(req): ValidatedJson<CalculatePayRequest>,
) -> ApiResult<BatchResult> {
    let result = services
        .payouts
        .calculate_monthly_tutor_pay(&req.payment_month)
        .await
        .map_err(domain_error)?;
    ok(result)
}

#[utoipa::path(
    get,
    path = "/api/v1/payouts",
    tag = "Payouts",
    params(MonthQuery),
    responses(
        (status = 200, description = "Payouts for the month", body = ApiResponse<Vec<TutorPayment>>)
    )
)]
pub async fn list_payouts(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Vec<TutorPayment>> {
    ok(services
        .payouts
        .list_by_month(&query.month)
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payouts/{id}/pay",
    tag = "Payouts",
    params(("id" = i32, Path, description = "Payout ID")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Payout settled", body = ApiResponse<TutorPayment>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Payout is not open")
    )
)]
pub async fn pay_payout(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<MarkPaidRequest>,
) -> ApiResult<TutorPayment> {
    let paid_at = req.paid_at.unwrap_or_else(Utc::now);
    ok(services
        .payouts
        .mark_paid(id, &req.payment_method, paid_at)
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payouts/{id}/overdue",
    tag = "Payouts",
    params(("id" = i32, Path, description = "Payout ID")),
    responses(
        (status = 200, description = "Payout marked overdue", body = ApiResponse<TutorPayment>),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_payout_overdue(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<TutorPayment> {
    ok(services.payouts.mark_overdue(id).await.map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/payouts/{id}/cancel",
    tag = "Payouts",
    params(("id" = i32, Path, description = "Payout ID")),
    responses(
        (status = 200, description = "Payout cancelled", body = ApiResponse<TutorPayment>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Payout already settled")
    )
)]
pub async fn cancel_payout(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<TutorPayment> {
    ok(services.payouts.cancel(id).await.map_err(domain_error)?)
}
