//! Visit (kunjungan) handlers.

use axum::{
    extract::{Extension, Path, State},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::AppState;
use crate::config::DEFAULT_VISIT_PAGE_SIZE;
use crate::domain::{
    CurrentUser, Lokasi, NewVisit, VisitDetailFields, VisitDetails, VisitPatch, VisitQuery,
};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListVisitsQuery {
    pub peserta_id: Option<i64>,
    /// Inclusive lower bound on the visit date
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper bound on the visit date
    pub end_date: Option<NaiveDate>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Visit with the examination fields of the participant's category
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateVisitRequest {
    pub peserta_id: i64,
    #[schema(example = "2026-01-15")]
    pub tanggal_kunjungan: NaiveDate,
    #[validate(range(min = 0.0, message = "Berat badan tidak boleh negatif"))]
    pub berat_badan: Option<f64>,
    #[serde(default)]
    pub rujuk: bool,
    #[serde(default)]
    pub lokasi: Lokasi,
    #[serde(flatten)]
    pub detail: VisitDetailFields,
}

/// Partial visit update; the participant cannot change
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateVisitRequest {
    pub tanggal_kunjungan: Option<NaiveDate>,
    #[validate(range(min = 0.0, message = "Berat badan tidak boleh negatif"))]
    pub berat_badan: Option<f64>,
    pub rujuk: Option<bool>,
    pub lokasi: Option<Lokasi>,
    #[serde(flatten)]
    pub detail: VisitDetailFields,
}

/// Create visit routes
pub fn visit_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_visits).post(create_visit))
        .route("/:id", get(get_visit).put(update_visit).delete(delete_visit))
}

/// List visits, newest first
#[utoipa::path(
    get,
    path = "/api/kunjungan",
    tag = "Kunjungan",
    security(("bearer_auth" = [])),
    params(ListVisitsQuery),
    responses(
        (status = 200, description = "Kunjungan list retrieved"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_visits(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListVisitsQuery>,
) -> AppResult<ApiResponse<Paginated<VisitDetails>>> {
    let query = VisitQuery {
        peserta_id: params.peserta_id,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let page = PaginationParams::new(params.page, params.limit, DEFAULT_VISIT_PAGE_SIZE);

    let visits = state.visit_service.list(query, page).await?;
    Ok(ApiResponse::with_message(visits, "Kunjungan list retrieved"))
}

/// Record a visit
#[utoipa::path(
    post,
    path = "/api/kunjungan",
    tag = "Kunjungan",
    security(("bearer_auth" = [])),
    request_body = CreateVisitRequest,
    responses(
        (status = 201, description = "Kunjungan recorded successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Visit transaction failed")
    )
)]
pub async fn create_visit(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateVisitRequest>,
) -> AppResult<Created<VisitDetails>> {
    let visit = NewVisit {
        peserta_id: payload.peserta_id,
        tanggal_kunjungan: payload.tanggal_kunjungan,
        berat_badan: payload.berat_badan,
        rujuk: payload.rujuk,
        lokasi: payload.lokasi,
        created_by: None,
    };

    let created = state
        .visit_service
        .create(&current_user, visit, payload.detail)
        .await?;
    Ok(Created(created, "Kunjungan recorded successfully"))
}

/// Visit with participant and examination detail
#[utoipa::path(
    get,
    path = "/api/kunjungan/{id}",
    tag = "Kunjungan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Kunjungan ID")),
    responses(
        (status = 200, description = "Kunjungan detail"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Kunjungan not found")
    )
)]
pub async fn get_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<VisitDetails>> {
    let visit = state.visit_service.get(id).await?;
    Ok(ApiResponse::success(visit))
}

/// Update visit and examination data
#[utoipa::path(
    put,
    path = "/api/kunjungan/{id}",
    tag = "Kunjungan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Kunjungan ID")),
    request_body = UpdateVisitRequest,
    responses(
        (status = 200, description = "Kunjungan updated successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Kunjungan not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateVisitRequest>,
) -> AppResult<ApiResponse<VisitDetails>> {
    let patch = VisitPatch {
        tanggal_kunjungan: payload.tanggal_kunjungan,
        berat_badan: payload.berat_badan,
        rujuk: payload.rujuk,
        lokasi: payload.lokasi,
    };

    let updated = state.visit_service.update(id, patch, payload.detail).await?;
    Ok(ApiResponse::with_message(updated, "Kunjungan updated successfully"))
}

/// Delete a visit and its examination record
#[utoipa::path(
    delete,
    path = "/api/kunjungan/{id}",
    tag = "Kunjungan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Kunjungan ID")),
    responses(
        (status = 200, description = "Kunjungan deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Kunjungan not found")
    )
)]
pub async fn delete_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.visit_service.delete(id).await?;
    Ok(ApiResponse::message("Kunjungan deleted successfully"))
}
