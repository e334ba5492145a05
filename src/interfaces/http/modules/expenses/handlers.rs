//! Expense REST handlers

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::dto::{CreateCategoryRequest, RecordExpenseRequest};
use crate::application::SharedFinanceServices;
use crate::domain::{Expense, ExpenseCategory};
use crate::interfaces::http::common::{
    domain_error, ok, ApiError, ApiResponse, ApiResult, EmptyData, ValidatedJson,
};

#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    tag = "Expenses",
    responses(
        (status = 200, description = "All expenses", body = ApiResponse<Vec<Expense>>)
    )
)]
pub async fn list_expenses(
    State(services): State<SharedFinanceServices>,
) -> ApiResult<Vec<Expense>> {
    ok(services.expenses.list_expenses().await.map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    tag = "Expenses",
    request_body = RecordExpenseRequest,
    responses(
        (status = 201, description = "Recorded", body = ApiResponse<Expense>),
        (status = 404, description = "Unknown category")
    )
)]
pub async fn record_expense(
    State(services): State<SharedFinanceServices>,
    ValidatedJson(req): ValidatedJson<RecordExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Expense>>), ApiError> {
    let expense = services
        .expenses
        .record_expense(
            req.category_id,
            req.amount,
            req.expense_date,
            req.description,
            req.recurring_interval,
        )
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(expense))))
}

#[utoipa::path(
    get,
    path = "/api/v1/expense-categories",
    tag = "Expenses",
    responses(
        (status = 200, description = "Categories", body = ApiResponse<Vec<ExpenseCategory>>)
    )
)]
pub async fn list_categories(
    State(services): State<SharedFinanceServices>,
) -> ApiResult<Vec<ExpenseCategory>> {
    ok(services.expenses.list_categories().await.map_err(domain_error)?)
}

#[utoipa::path(
    post,
    path = "/api/v1/expense-categories",
    tag = "Expenses",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<ExpenseCategory>),
        (status = 409, description = "Name already taken")
    )
)]
pub async fn create_category(
    State(services): State<SharedFinanceServices>,
    ValidatedJson(req): ValidatedJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ExpenseCategory>>), ApiError> {
    let category = services
        .expenses
        .create_category(&req.name, req.category_type)
        .await
        .map_err(domain_error)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(category))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/expense-categories/{id}",
    tag = "Expenses",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<EmptyData>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Category still has expenses")
    )
)]
pub async fn delete_category(
    State(services): State<SharedFinanceServices>,
    Path(id): Path<i32>,
) -> ApiResult<EmptyData> {
    services
        .expenses
        .delete_category(id)
        .await
        .map_err(domain_error)?;
    ok(EmptyData {})
}
