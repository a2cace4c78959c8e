//! Dashboard handlers.

use axum::{extract::State, routing::get, Router};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::extractors::QueryParams;
use crate::api::AppState;
use crate::domain::{DashboardStats, MonthlyRegistrations, MonthlyVisits};
use crate::errors::AppResult;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RegistrationChartQuery {
    /// Calendar year, defaults to the current one
    pub year: Option<i32>,
}

/// Create dashboard routes
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/chart", get(visit_chart))
        .route("/registrations", get(registration_chart))
}

/// Headline counts
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard statistics retrieved", body = DashboardStats),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn stats(State(state): State<AppState>) -> AppResult<ApiResponse<DashboardStats>> {
    let stats = state.dashboard_service.stats().await?;
    Ok(ApiResponse::with_message(stats, "Dashboard statistics retrieved"))
}

/// Visits per month over the last twelve months
#[utoipa::path(
    get,
    path = "/api/dashboard/chart",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Dashboard chart data retrieved", body = Vec<MonthlyVisits>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn visit_chart(
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<MonthlyVisits>>> {
    let chart = state.dashboard_service.visit_chart().await?;
    Ok(ApiResponse::with_message(chart, "Dashboard chart data retrieved"))
}

/// Participant registrations per month of a year
#[utoipa::path(
    get,
    path = "/api/dashboard/registrations",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    params(RegistrationChartQuery),
    responses(
        (status = 200, description = "Dashboard registration chart data retrieved", body = Vec<MonthlyRegistrations>),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn registration_chart(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<RegistrationChartQuery>,
) -> AppResult<ApiResponse<Vec<MonthlyRegistrations>>> {
    let chart = state
        .dashboard_service
        .registration_chart(params.year)
        .await?;
    Ok(ApiResponse::with_message(
        chart,
        "Dashboard registration chart data retrieved",
    ))
}
