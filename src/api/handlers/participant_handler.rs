//! Participant (peserta) handlers.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::NIK_DIGITS;
use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::AppState;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::domain::participant::{parse_projection, project};
use crate::domain::{
    ExtensionFields, JenisKelamin, Kategori, LatestVisit, NewParticipant, Nik, ParticipantDetails,
    ParticipantPatch, ParticipantQuery, ParticipantSort, SortOrder,
};
use crate::errors::{AppError, AppResult};
use crate::types::{ApiResponse, Created, PaginationParams};

/// Listing filters, sorting, paging and projection
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParticipantsQuery {
    /// Name fragment or exact NIK
    pub search: Option<String>,
    pub kategori: Option<Kategori>,
    /// `L` or `P`
    pub gender: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    pub sort_by: Option<ParticipantSort>,
    pub sort_order: Option<SortOrder>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Comma separated columns to return
    pub fields: Option<String>,
}

impl ListParticipantsQuery {
    fn split(self) -> (ParticipantQuery, PaginationParams, Option<String>) {
        let query = ParticipantQuery {
            search: self.search.filter(|s| !s.trim().is_empty()),
            kategori: self.kategori,
            jenis_kelamin: self.gender.as_deref().and_then(JenisKelamin::from_code),
            min_age: self.min_age,
            max_age: self.max_age,
            rt: self.rt,
            rw: self.rw,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        };
        let page = PaginationParams::new(self.page, self.limit, DEFAULT_PAGE_SIZE);
        (query, page, self.fields)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    pub limit: Option<u64>,
}

/// Participant registration: master fields plus the category fields
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateParticipantRequest {
    #[validate(regex(path = *NIK_DIGITS, message = "NIK harus 16 digit angka"))]
    #[schema(example = "3201010101010001")]
    pub nik: String,
    #[validate(length(min = 1, max = 255, message = "Nama wajib diisi, maksimal 255 karakter"))]
    #[schema(example = "Ani Lestari")]
    pub nama: String,
    pub kategori: Kategori,
    #[schema(example = "2024-03-01")]
    pub tanggal_lahir: NaiveDate,
    pub jenis_kelamin: JenisKelamin,
    pub alamat: Option<String>,
    #[validate(length(max = 4, message = "RT maksimal 4 karakter"))]
    pub rt: Option<String>,
    #[validate(length(max = 4, message = "RW maksimal 4 karakter"))]
    pub rw: Option<String>,
    #[validate(length(max = 20, message = "Telepon maksimal 20 karakter"))]
    pub telepon: Option<String>,
    #[serde(default)]
    pub kepesertaan_bpjs: bool,
    pub nomor_bpjs: Option<String>,
    #[serde(flatten)]
    pub extension: ExtensionFields,
}

/// Partial participant update. `kategori` cannot change.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateParticipantRequest {
    #[validate(regex(path = *NIK_DIGITS, message = "NIK harus 16 digit angka"))]
    pub nik: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Nama wajib diisi, maksimal 255 karakter"))]
    pub nama: Option<String>,
    pub tanggal_lahir: Option<NaiveDate>,
    pub jenis_kelamin: Option<JenisKelamin>,
    pub alamat: Option<String>,
    #[validate(length(max = 4, message = "RT maksimal 4 karakter"))]
    pub rt: Option<String>,
    #[validate(length(max = 4, message = "RW maksimal 4 karakter"))]
    pub rw: Option<String>,
    #[validate(length(max = 20, message = "Telepon maksimal 20 karakter"))]
    pub telepon: Option<String>,
    pub kepesertaan_bpjs: Option<bool>,
    pub nomor_bpjs: Option<String>,
    #[serde(flatten)]
    pub extension: ExtensionFields,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BulkDeleteRequest {
    #[validate(length(min = 1, message = "Pilih minimal satu peserta"))]
    pub ids: Vec<i64>,
}

/// Create participant routes
pub fn participant_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_participants).post(create_participant))
        .route("/summary", get(participant_summary))
        .route("/bulk-delete", post(bulk_delete_participants))
        .route(
            "/:id",
            get(get_participant)
                .put(update_participant)
                .delete(delete_participant),
        )
        .route("/:id/latest-visit", get(latest_visit))
}

/// List participants with server-side filtering
#[utoipa::path(
    get,
    path = "/api/peserta",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(ListParticipantsQuery),
    responses(
        (status = 200, description = "Peserta list retrieved"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_participants(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParticipantsQuery>,
) -> AppResult<Response> {
    let (query, page, fields) = params.split();
    let listing = state.participant_service.list(query, page).await?;

    let response = match parse_projection(fields.as_deref()) {
        Some(columns) => ApiResponse::with_message(
            listing.map(|row| {
                serde_json::to_value(row)
                    .map(|value| project(value, &columns))
                    .unwrap_or_default()
            }),
            "Peserta list retrieved",
        )
        .into_response(),
        None => ApiResponse::with_message(listing, "Peserta list retrieved").into_response(),
    };
    Ok(response)
}

/// Compact participant list for pickers, cacheable by ETag
#[utoipa::path(
    get,
    path = "/api/peserta/summary",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(SummaryQuery),
    responses(
        (status = 200, description = "Peserta summary retrieved", body = Vec<crate::domain::ParticipantSummary>),
        (status = 304, description = "Summary unchanged since the given ETag"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn participant_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
    QueryParams(params): QueryParams<SummaryQuery>,
) -> AppResult<Response> {
    let summary = state.participant_service.summary(params.limit).await?;
    let body = serde_json::to_vec(&ApiResponse::with_message(summary, "Peserta summary retrieved"))
        .map_err(|e| AppError::internal(format!("Failed to encode summary: {}", e)))?;
    let etag = entity_tag(&body);

    let unchanged = headers
        .get(header::IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|candidates| etag_matches(candidates, &etag));
    if unchanged {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CONTENT_TYPE, "application/json".to_string()),
        ],
        body,
    )
        .into_response())
}

/// Strong entity tag of a response body.
fn entity_tag(body: &[u8]) -> String {
    format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// `If-None-Match` carries a list of tags or `*`.
fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == etag)
}

/// Register a participant with its category data
#[utoipa::path(
    post,
    path = "/api/peserta",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    request_body = CreateParticipantRequest,
    responses(
        (status = 201, description = "Peserta registered successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "NIK already registered"),
        (status = 422, description = "Validation error"),
        (status = 500, description = "Registration transaction failed")
    )
)]
pub async fn create_participant(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateParticipantRequest>,
) -> AppResult<Created<ParticipantDetails>> {
    let participant = NewParticipant {
        nik: Nik::parse(&payload.nik)?,
        nama: payload.nama.trim().to_string(),
        kategori: payload.kategori,
        tanggal_lahir: payload.tanggal_lahir,
        jenis_kelamin: payload.jenis_kelamin,
        alamat: payload.alamat,
        rt: payload.rt,
        rw: payload.rw,
        telepon: payload.telepon,
        kepesertaan_bpjs: payload.kepesertaan_bpjs,
        nomor_bpjs: payload.nomor_bpjs,
    };

    let created = state
        .participant_service
        .create(participant, payload.extension)
        .await?;
    Ok(Created(created, "Peserta registered successfully"))
}

/// Participant with extension and last visit date
#[utoipa::path(
    get,
    path = "/api/peserta/{id}",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Peserta ID")),
    responses(
        (status = 200, description = "Peserta detail"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Peserta not found")
    )
)]
pub async fn get_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ParticipantDetails>> {
    let participant = state.participant_service.get(id).await?;
    Ok(ApiResponse::success(participant))
}

/// Update master and category data
#[utoipa::path(
    put,
    path = "/api/peserta/{id}",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Peserta ID")),
    request_body = UpdateParticipantRequest,
    responses(
        (status = 200, description = "Peserta updated successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Peserta not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateParticipantRequest>,
) -> AppResult<ApiResponse<ParticipantDetails>> {
    let patch = ParticipantPatch {
        nik: payload.nik.as_deref().map(Nik::parse).transpose()?,
        nama: payload.nama.map(|n| n.trim().to_string()),
        tanggal_lahir: payload.tanggal_lahir,
        jenis_kelamin: payload.jenis_kelamin,
        alamat: payload.alamat,
        rt: payload.rt,
        rw: payload.rw,
        telepon: payload.telepon,
        kepesertaan_bpjs: payload.kepesertaan_bpjs,
        nomor_bpjs: payload.nomor_bpjs,
    };

    let updated = state
        .participant_service
        .update(id, patch, payload.extension)
        .await?;
    Ok(ApiResponse::with_message(updated, "Peserta updated successfully"))
}

/// Delete a participant with its extension and visits
#[utoipa::path(
    delete,
    path = "/api/peserta/{id}",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Peserta ID")),
    responses(
        (status = 200, description = "Peserta deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Peserta not found")
    )
)]
pub async fn delete_participant(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.participant_service.delete(id).await?;
    Ok(ApiResponse::message("Peserta deleted successfully"))
}

/// Delete several participants in one statement
#[utoipa::path(
    post,
    path = "/api/peserta/bulk-delete",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Number of deleted participants"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn bulk_delete_participants(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<BulkDeleteRequest>,
) -> AppResult<ApiResponse<Value>> {
    let deleted = state.participant_service.bulk_delete(payload.ids).await?;
    Ok(ApiResponse::with_message(
        json!({ "deleted_count": deleted }),
        format!("Berhasil menghapus {} peserta", deleted),
    ))
}

/// Most recent visit with its examination data
#[utoipa::path(
    get,
    path = "/api/peserta/{id}/latest-visit",
    tag = "Peserta",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Peserta ID")),
    responses(
        (status = 200, description = "Latest visit"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Peserta or visit not found")
    )
)]
pub async fn latest_visit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<LatestVisit>> {
    let visit = state.participant_service.latest_visit(id).await?;
    Ok(ApiResponse::success(visit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_codes_map_to_filter() {
        let query = ListParticipantsQuery {
            gender: Some("P".into()),
            limit: Some(500),
            ..Default::default()
        };
        let (query, page, _) = query.split();
        assert_eq!(query.jenis_kelamin, Some(JenisKelamin::Perempuan));
        assert_eq!(page.per_page, crate::config::MAX_PAGE_SIZE);
    }

    #[test]
    fn unknown_gender_is_ignored() {
        let query = ListParticipantsQuery {
            gender: Some("X".into()),
            ..Default::default()
        };
        assert_eq!(query.split().0.jenis_kelamin, None);
    }

    #[test]
    fn etag_comparison_handles_lists_and_wildcards() {
        let tag = entity_tag(b"{}");
        assert!(etag_matches(&tag, &tag));
        assert!(etag_matches(&format!("\"other\", W/{}", tag), &tag));
        assert!(etag_matches("*", &tag));
        assert!(!etag_matches("\"stale\"", &tag));
    }
}
