//! Teacher rate REST handlers

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

use super::dto::{CreateRateRequest, RatesQuery, ResolveRateQuery, UpdateRateRequest};
use crate::application::SharedFinanceServices;
use crate::domain::TeacherRate;
use crate::interfaces::http::common::{
    domain_error, ok, ApiError, ApiResponse, ApiResult, ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/v1/rates",
    tag = "Rates",
    params(RatesQuery),
    responses(
        (status = 200, description = "Rates", body = ApiResponse<Vec<TeacherRate>>)
    )
)]
pub async fn list_rates(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<RatesQuery>,
) -> ApiResult<Vec<TeacherRate>> {
    let rates = match query.teacher_id {
        Some(teacher_id) => services.rates.history(teacher_id).await,
        None => services.rates.list_active().await,
    }
    .map_err(domain_error)?;
    ok(rates)
}

#[utoipa::path(
    post,
    path = "/api/v1/rates",
    tag = "Rates",
    request_body = CreateRateRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<TeacherRate>),
        (status = 422, description = "Validation failed")
    )
)]
pub async fn create_rate(
    State(services): State<SharedFinanceServices>,
    ValidatedJson(req): ValidatedJson<CreateRateRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeacherRate>>), ApiError> {
    let rate = services
        .rates
        .create_rate(req.teacher_id, req.rate_type, req.amount, req.effective_date)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(rate))))
}

#[utoipa::path(
    put,
    path = "/api/v1/rates/{id}",
    tag = "Rates",
    params(("id" = i32, Path, description = "Rate ID")),
    request_body = UpdateRateRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<TeacherRate>),
        (status = 400, description = "No field to change"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Rate already used by payouts")
    )
)]
pub async fn update_rate(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
    ValidatedJson(req): ValidatedJson<UpdateRateRequest>,
) -> ApiResult<TeacherRate> {
    ok(services
        .rates
        .update_rate(id, req.into())
        .await
        .map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/rates/{id}/deactivate",
    tag = "Rates",
    params(("id" = i32, Path, description = "Rate ID")),
    responses(
        (status = 200, description = "Deactivated", body = ApiResponse<TeacherRate>),
        (status = 404, description = "Not found")
    )
)]
pub async fn deactivate_rate(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<TeacherRate> {
    ok(services.rates.deactivate_rate(id).await.map_err(domain_error)?)
}

#[utoipa::path(
    get,
    path = "/api/v1/rates/resolve",
    tag = "Rates",
    params(ResolveRateQuery),
    responses(
        (status = 200, description = "Rate in force on the date", body = ApiResponse<TeacherRate>),
        (status = 404, description = "No rate in force")
    )
)]
pub async fn resolve_rate(
    State(services): State<SharedFinanceServices>,
    Query(query): Query<ResolveRateQuery>,
) -> ApiResult<TeacherRate> {
    let on_date = query.on_date.unwrap_or_else(|| Utc::now().date_naive());
    ok(services
        .rates
        .resolve(query.teacher_id, on_date, query.rate_type)
        .await
        .map_err(domain_error)?)
}
