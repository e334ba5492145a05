//! Tuition billing REST handlers

use axum::extract::{Path, Query, State};
use chrono::Utc;

use super::dto::{AsOfQuery, GenerateBillingRequest, SweepOverdueResponse};
use crate::application::services::AgingSummary;
use crate::application::SharedFinanceServices;
use crate::domain::{BatchResult, TuitionBilling};
use crate::interfaces::http::common::{
    domain_error, ok, ApiResponse, ApiResult, MarkPaidRequest, MonthQuery, ValidatedJson,
};

#[utoipa::path(
    post,
    path = "/api/v1/billings/generate",
    tag = "Billing",
    request_body = GenerateBillingRequest,
    responses(
        (status = 200, description = "Run summary", body = ApiResponse<BatchResult>),
        (status = 400, description = "Malformed month or missing due date"),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn generate_billing(
    State(services): State<SharedFinanceServices>,
    ValidatedJson(req): ValidatedJson<GenerateBillingRequest>,
) -> ApiResult<BatchResult> {
    let result = services
        .billing
        .generate_monthly_billing(&req.billing_month, req.due_date, req.class_ids.as_deref())
        .await
        .map_err(domain_error)?;
    ok(result)
}

#[utoipa::path(
    get,
    path = "/api/v1/billings",
    tag = "Billing",
    params(MonthQuery),
    responses(
        (status = 200, description = "Invoices for the month", body = ApiResponse<Vec<TuitionBilling>>),
        (status = 400, description = "Malformed month")
    )
)]
pub async fn list_billings(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<MonthQuery>,
) -> ApiResult<Vec<TuitionBilling>> {
    let billings = services
        .billing
        .list_by_month(&query.month)
        .await
        .map_err(domain_error)?;
    ok(billings)
}

#[utoipa::path(
    post,
    path = "/api/v1/billings/{id}/pay",
    tag = "Billing",
    params(("id" = i32, Path, description = "Billing ID")),
    request_body = MarkPaidRequest,
    responses(
        (status = 200, description = "Invoice settled", body = ApiResponse<TuitionBilling>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invoice is not open")
    )
)]
pub async fn pay_billing(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<MarkPaidRequest>,
) -> ApiResult<TuitionBilling> {
    let paid_at = req.paid_at.unwrap_or_else(Utc::now);
    let billing = services
        .billing
        .mark_paid(id, &req.payment_method, paid_at)
        .await
        .map_err(domain_error)?;
    ok(billing)
}

#[utoipa::path(
    post,
    path = "/api/v1/billings/{id}/overdue",
    tag = "Billing",
    params(("id" = i32, Path, description = "Billing ID")),
    responses(
        (status = 200, description = "Invoice marked overdue", body = ApiResponse<TuitionBilling>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invoice is not pending")
    )
)]
pub async fn mark_billing_overdue(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<TuitionBilling> {
    ok(services.billing.mark_overdue(id).await.map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/billings/{id}/cancel",
    tag = "Billing",
    params(("id" = i32, Path, description = "Billing ID")),
    responses(
        (status = 200, description = "Invoice cancelled", body = ApiResponse<TuitionBilling>),
        (status = 404, description = "Not found"),
        (status = 422, description = "Invoice already settled")
    )
)]
pub async fn cancel_billing(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<TuitionBilling> {
    ok(services.billing.cancel(id).await.map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/billings/sweep-overdue",
    tag = "Billing",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Pending invoices past due were flipped", body = ApiResponse<SweepOverdueResponse>)
    )
)]
pub async fn sweep_overdue(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<SweepOverdueResponse> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    let updated = services
        .billing
        .sweep_overdue(as_of)
        .await
        .map_err(domain_error)?;
    ok(SweepOverdueResponse { as_of, updated })
}

#[utoipa::path(
    get,
    path = "/api/v1/billings/aging",
    tag = "Billing",
    params(AsOfQuery),
    responses(
        (status = 200, description = "Overdue invoices grouped by age", body = ApiResponse<AgingSummary>)
    )
)]
pub async fn aging_report(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<AsOfQuery>,
) -> ApiResult<AgingSummary> {
    let as_of = query.as_of.unwrap_or_else(|| Utc::now().date_naive());
    ok(services.aging.report(as_of).await.map_err(domain_error)?)
}
