//! API router with Swagger UI

use axum::{
    extract::FromRef,
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use sea_orm::DatabaseConnection;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::common::{ApiResponse, EmptyData, MarkPaidRequest};
use super::modules::{billing, expenses, health, metrics, payouts, rates, reports};
use crate::application::services::{
    AgedBilling, AgingBucket, AgingSummary, BucketSummary, CategoryTotal, CollectionRate,
    ExpenseBreakdown, MonthlyCashFlow, Profitability, ProjectedRevenue,
};
use crate::application::SharedFinanceServices;
use crate::domain::{
    BatchFailure, BatchResult, CategoryType, Expense, ExpenseCategory, RateType,
    RecurringInterval, SettlementStatus, TeacherRate, TuitionBilling, TutorPayment,
};

/// Router state. Each handler extracts only its own part via `FromRef`.
#[derive(Clone)]
pub struct ApiState {
    pub services: SharedFinanceServices,
    pub health: health::HealthState,
    pub metrics: metrics::MetricsState,
}

impl FromRef<ApiState> for SharedFinanceServices {
    fn from_ref(s: &ApiState) -> Self {
        s.services.clone()
    }
}

impl FromRef<ApiState> for health::HealthState {
    fn from_ref(s: &ApiState) -> Self {
        s.health.clone()
    }
}

impl FromRef<ApiState> for metrics::MetricsState {
    fn from_ref(s: &ApiState) -> Self {
        s.metrics.clone()
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        billing::generate_billing,
        billing::list_billings,
        billing::pay_billing,
        billing::mark_billing_overdue,
        billing::cancel_billing,
        billing::sweep_overdue,
        billing::aging_report,
        payouts::calculate_pay,
        payouts::list_payouts,
        payouts::pay_payout,
        payouts::mark_payout_overdue,
        payouts::cancel_payout,
        rates::list_rates,
        rates::create_rate,
        rates::update_rate,
        rates::deactivate_rate,
        rates::resolve_rate,
        expenses::list_expenses,
        expenses::record_expense,
        expenses::list_categories,
        expenses::create_category,
        expenses::delete_category,
        reports::collection_rate,
        reports::cash_flow,
        reports::profitability,
        reports::projected_revenue,
        reports::expense_breakdown,
    ),
    components(
        schemas(
            ApiResponse<String>,
            EmptyData,
            MarkPaidRequest,
            health::HealthResponse,
            health::ComponentHealth,
            SettlementStatus,
            BatchResult,
            BatchFailure,
            TuitionBilling,
            TutorPayment,
            TeacherRate,
            RateType,
            Expense,
            ExpenseCategory,
            CategoryType,
            RecurringInterval,
            AgingBucket,
            AgedBilling,
            BucketSummary,
            AgingSummary,
            CollectionRate,
            MonthlyCashFlow,
            Profitability,
            ProjectedRevenue,
            CategoryTotal,
            ExpenseBreakdown,
            billing::GenerateBillingRequest,
            billing::SweepOverdueResponse,
            payouts::CalculatePayRequest,
            rates::CreateRateRequest,
            rates::UpdateRateRequest,
            expenses::RecordExpenseRequest,
            expenses::CreateCategoryRequest,
        )
    ),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Billing", description = "Monthly tuition invoices, settlement and aging"),
        (name = "Payouts", description = "Monthly tutor compensation"),
        (name = "Rates", description = "Effective-dated teacher rate history"),
        (name = "Expenses", description = "Operating expenses and their categories"),
        (name = "Reports", description = "Collection rate, cash flow, profitability and projections"),
    ),
    info(
        title = "Tutoring Finance API",
        version = "1.0.0",
        description = "Tuition billing, tutor payouts and financial reporting"
    )
)]
pub struct ApiDoc;

pub fn create_api_router(
    services: SharedFinanceServices,
    db: Option<DatabaseConnection>,
    prometheus: PrometheusHandle,
) -> Router {
    let state = ApiState {
        services,
        health: health::HealthState::new(db),
        metrics: metrics::MetricsState { handle: prometheus },
    };

    let billing_routes = Router::new()
        .route("/", get(billing::list_billings))
        .route("/generate", post(billing::generate_billing))
        .route("/sweep-overdue", post(billing::sweep_overdue))
        .route("/aging", get(billing::aging_report))
        .route("/{id}/pay", post(billing::pay_billing))
        .route("/{id}/overdue", post(billing::mark_billing_overdue))
        .route("/{id}/cancel", post(billing::cancel_billing));

    let payout_routes = Router::new()
        .route("/", get(payouts::list_payouts))
        .route("/calculate", post(payouts::calculate_pay))
        .route("/{id}/pay", post(payouts::pay_payout))
        .route("/{id}/overdue", post(payouts::mark_payout_overdue))
        .route("/{id}/cancel", post(payouts::cancel_payout));

    let rate_routes = Router::new()
        .route("/", get(rates::list_rates).post(rates::create_rate))
        .route("/resolve", get(rates::resolve_rate))
        .route("/{id}", put(rates::update_rate))
        .route("/{id}/deactivate", post(rates::deactivate_rate));

    let expense_routes = Router::new().route(
        "/",
        get(expenses::list_expenses).post(expenses::record_expense),
    );

    let category_routes = Router::new()
        .route(
            "/",
            get(expenses::list_categories).post(expenses::create_category),
        )
        .route("/{id}", delete(expenses::delete_category));

    let report_routes = Router::new()
        .route("/collection-rate", get(reports::collection_rate))
        .route("/cash-flow", get(reports::cash_flow))
        .route("/profitability", get(reports::profitability))
        .route("/projected-revenue", get(reports::projected_revenue))
        .route("/expense-breakdown", get(reports::expense_breakdown));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::prometheus_metrics))
        .nest("/api/v1/billings", billing_routes)
        .nest("/api/v1/payouts", payout_routes)
        .nest("/api/v1/rates", rate_routes)
        .nest("/api/v1/expenses", expense_routes)
        .nest("/api/v1/expense-categories", category_routes)
        .nest("/api/v1/reports", report_routes)
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
