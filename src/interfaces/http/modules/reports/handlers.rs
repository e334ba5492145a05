//! Read-only financial reports over a month window

use axum::extract::{Query, State};

use crate::application::services::{
    CollectionRate, ExpenseBreakdown, MonthlyCashFlow, Profitability, ProjectedRevenue,
};
use crate::application::SharedFinanceServices;
use crate::domain::PeriodRange;
use crate::interfaces::http::common::{
    domain_error, ok, ApiError, ApiResponse, ApiResult, PeriodRangeQuery,
};

fn window(query: &PeriodRangeQuery) -> Result<PeriodRange, ApiError> {
    PeriodRange::parse(&query.from, &query.to).map_err(domain_error)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/collection-rate",
    tag = "Reports",
    params(PeriodRangeQuery),
    responses(
        (status = 200, description = "Collected share of billed tuition", body = ApiResponse<CollectionRate>),
        (status = 400, description = "Malformed or inverted window")
    )
)]
pub async fn collection_rate(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<PeriodRangeQuery>,
) -> ApiResult<CollectionRate> {
    let window = window(&query)?;
    ok(services
        .reports
        .collection_rate(window)
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/cash-flow",
    tag = "Reports",
    params(PeriodRangeQuery),
    responses(
        (status = 200, description = "One entry per month", body = ApiResponse<Vec<MonthlyCashFlow>>),
        (status = 400, description = "Malformed or inverted window")
    )
)]
pub async fn cash_flow(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<PeriodRangeQuery>,
) -> ApiResult<Vec<MonthlyCashFlow>> {
    let window = window(&query)?;
    ok(services
        .reports
        .cash_flow_series(window)
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/profitability",
    tag = "Reports",
    params(PeriodRangeQuery),
    responses(
        (status = 200, description = "Accrual-basis profitability", body = ApiResponse<Profitability>),
        (status = 400, description = "Malformed or inverted window")
    )
)]
pub async fn profitability(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<PeriodRangeQuery>,
) -> ApiResult<Profitability> {
    let window = window(&query)?;
    ok(services
        .reports
        .profitability(window)
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/projected-revenue",
    tag = "Reports",
    responses(
        (status = 200, description = "Tuition implied by current enrollments", body = ApiResponse<ProjectedRevenue>)
    )
)]
pub async fn projected_revenue(
    State(services): State<SharedFinanceServices>,
) -> ApiResult<ProjectedRevenue> {
    ok(services
        .reports
        .projected_revenue()
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/expense-breakdown",
    tag = "Reports",
    params(PeriodRangeQuery),
    responses(
        (status = 200, description = "Expenses per category type", body = ApiResponse<ExpenseBreakdown>),
        (status = 400, description = "Malformed or inverted window")
    )
)]
pub async fn expense_breakdown(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<PeriodRangeQuery>,
) -> ApiResult<ExpenseBreakdown> {
    let window = window(&query)?;
    ok(services
        .reports
        .expense_breakdown(window)
        .await
        .map_err(domain_error)?)
}
