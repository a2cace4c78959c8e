//! Complaint (pengaduan) handlers.

use axum::{
    extract::{multipart::MultipartError, Extension, Multipart, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{QueryParams, ValidatedJson};
use crate::api::AppState;
use crate::config::DEFAULT_COMPLAINT_PAGE_SIZE;
use crate::domain::{
    Complaint, ComplaintCategory, ComplaintDetails, ComplaintListItem, ComplaintQuery,
    ComplaintResponse, ComplaintStats, ComplaintStatus, CurrentUser, NewComplaint, Priority,
};
use crate::errors::{AppError, AppResult, FieldErrors};
use crate::services::ImageUpload;
use crate::types::{ApiResponse, Created, Paginated, PaginationParams};

const MAX_TITLE_LENGTH: usize = 255;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListComplaintsQuery {
    pub status: Option<ComplaintStatus>,
    pub kategori: Option<ComplaintCategory>,
    /// Matches title or description
    pub search: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ComplaintStatus,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddResponseRequest {
    #[validate(length(min = 1, message = "Respon wajib diisi"))]
    pub response: String,
}

/// Multipart form for a new complaint, documented for the API explorer.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateComplaintForm {
    kategori: ComplaintCategory,
    prioritas: Priority,
    #[schema(max_length = 255)]
    judul: String,
    deskripsi: String,
    langkah_reproduksi: Option<String>,
    browser_info: Option<String>,
    /// Up to three jpeg/png screenshots of at most 2 MB each
    #[schema(value_type = Vec<String>, format = Binary)]
    images: Vec<Vec<u8>>,
}

/// Text fields collected from the multipart body.
#[derive(Debug, Default)]
struct ComplaintFields {
    kategori: Option<String>,
    prioritas: Option<String>,
    judul: Option<String>,
    deskripsi: Option<String>,
    langkah_reproduksi: Option<String>,
    browser_info: Option<String>,
}

impl ComplaintFields {
    fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "kategori" => &mut self.kategori,
            "prioritas" => &mut self.prioritas,
            "judul" => &mut self.judul,
            "deskripsi" => &mut self.deskripsi,
            "langkah_reproduksi" => &mut self.langkah_reproduksi,
            "browser_info" => &mut self.browser_info,
            _ => return,
        };
        *slot = Some(value);
    }

    fn into_new_complaint(self) -> AppResult<NewComplaint> {
        let mut errors = FieldErrors::new();
        let mut fail = |field: &str, message: &str| {
            errors
                .entry(field.to_string())
                .or_default()
                .push(message.to_string());
        };

        let kategori = required(self.kategori)
            .and_then(|v| ComplaintCategory::from_str(&v).ok());
        if kategori.is_none() {
            fail(
                "kategori",
                "Kategori harus salah satu dari: error, tampilan, data, performa, lainnya",
            );
        }
        let prioritas = required(self.prioritas).and_then(|v| Priority::from_str(&v).ok());
        if prioritas.is_none() {
            fail("prioritas", "Prioritas harus salah satu dari: rendah, sedang, tinggi");
        }
        let judul = required(self.judul);
        match &judul {
            None => fail("judul", "Judul wajib diisi"),
            Some(j) if j.chars().count() > MAX_TITLE_LENGTH => {
                fail("judul", "Judul maksimal 255 karakter")
            }
            Some(_) => {}
        }
        let deskripsi = required(self.deskripsi);
        if deskripsi.is_none() {
            fail("deskripsi", "Deskripsi wajib diisi");
        }

        match (kategori, prioritas, judul, deskripsi) {
            (Some(kategori), Some(prioritas), Some(judul), Some(deskripsi)) if errors.is_empty() => {
                Ok(NewComplaint {
                    kategori,
                    prioritas,
                    judul,
                    deskripsi,
                    langkah_reproduksi: required(self.langkah_reproduksi),
                    browser_info: required(self.browser_info),
                })
            }
            _ => Err(AppError::Validation(errors)),
        }
    }
}

/// Trimmed, non-empty value.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::bad_request(format!("Invalid multipart body: {}", e.body_text()))
}

/// Create complaint routes
pub fn complaint_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_complaints).post(create_complaint))
        .route("/stats", get(complaint_stats))
        .route("/:id", get(get_complaint).delete(delete_complaint))
        .route("/:id/status", put(update_status))
        .route("/:id/responses", post(add_response))
}

/// Submit a complaint with optional screenshots
#[utoipa::path(
    post,
    path = "/api/pengaduan",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    request_body(content = CreateComplaintForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Pengaduan berhasil dikirim"),
        (status = 400, description = "Malformed multipart body"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_complaint(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Created<ComplaintDetails>> {
    let mut fields = ComplaintFields::default();
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" || name == "images[]" {
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            images.push(ImageUpload {
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.set(&name, value);
        }
    }

    let complaint = fields.into_new_complaint()?;
    let created = state
        .complaint_service
        .create(&current_user, complaint, images)
        .await?;
    Ok(Created(created, "Pengaduan berhasil dikirim"))
}

/// List complaints visible to the caller
#[utoipa::path(
    get,
    path = "/api/pengaduan",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    params(ListComplaintsQuery),
    responses(
        (status = 200, description = "Pengaduan list retrieved"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_complaints(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListComplaintsQuery>,
) -> AppResult<ApiResponse<Paginated<ComplaintListItem>>> {
    let query = ComplaintQuery {
        owner: None,
        status: params.status,
        kategori: params.kategori,
        search: params.search.filter(|s| !s.trim().is_empty()),
    };
    let page = PaginationParams::new(params.page, params.per_page, DEFAULT_COMPLAINT_PAGE_SIZE);

    let complaints = state
        .complaint_service
        .list(&current_user, query, page)
        .await?;
    Ok(ApiResponse::success(complaints))
}

/// Complaint with images and replies
#[utoipa::path(
    get,
    path = "/api/pengaduan/{id}",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pengaduan ID")),
    responses(
        (status = 200, description = "Pengaduan detail"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this complaint"),
        (status = 404, description = "Pengaduan not found")
    )
)]
pub async fn get_complaint(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<ComplaintDetails>> {
    let complaint = state.complaint_service.get(&current_user, id).await?;
    Ok(ApiResponse::success(complaint))
}

/// Move a complaint to any status (admin only)
#[utoipa::path(
    put,
    path = "/api/pengaduan/{id}/status",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pengaduan ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status berhasil diperbarui"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Pengaduan not found")
    )
)]
pub async fn update_status(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<UpdateStatusRequest>,
) -> AppResult<ApiResponse<Complaint>> {
    let complaint = state
        .complaint_service
        .update_status(&current_user, id, payload.status)
        .await?;
    Ok(ApiResponse::with_message(complaint, "Status berhasil diperbarui"))
}

/// Append an admin reply
#[utoipa::path(
    post,
    path = "/api/pengaduan/{id}/responses",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pengaduan ID")),
    request_body = AddResponseRequest,
    responses(
        (status = 201, description = "Respon berhasil ditambahkan"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only"),
        (status = 404, description = "Pengaduan not found"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn add_response(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(payload): ValidatedJson<AddResponseRequest>,
) -> AppResult<Created<ComplaintResponse>> {
    let response = state
        .complaint_service
        .add_response(&current_user, id, payload.response.trim().to_string())
        .await?;
    Ok(Created(response, "Respon berhasil ditambahkan"))
}

/// Ticket counts per status (admin only)
#[utoipa::path(
    get,
    path = "/api/pengaduan/stats",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Complaint statistics", body = ComplaintStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin only")
    )
)]
pub async fn complaint_stats(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<ComplaintStats>> {
    let stats = state.complaint_service.stats(&current_user).await?;
    Ok(ApiResponse::success(stats))
}

/// Soft delete a complaint (owner or admin)
#[utoipa::path(
    delete,
    path = "/api/pengaduan/{id}",
    tag = "Pengaduan",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Pengaduan ID")),
    responses(
        (status = 200, description = "Pengaduan berhasil dihapus"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the owner of this complaint"),
        (status = 404, description = "Pengaduan not found")
    )
)]
pub async fn delete_complaint(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    state.complaint_service.delete(&current_user, id).await?;
    Ok(ApiResponse::message("Pengaduan berhasil dihapus"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ComplaintFields {
        let mut fields = ComplaintFields::default();
        fields.set("kategori", "tampilan".into());
        fields.set("prioritas", "tinggi".into());
        fields.set("judul", "Tombol simpan tidak muncul".into());
        fields.set("deskripsi", "Di halaman peserta".into());
        fields.set("browser_info", "  ".into());
        fields.set("unknown", "ignored".into());
        fields
    }

    #[test]
    fn complete_form_becomes_new_complaint() {
        let complaint = filled().into_new_complaint().unwrap();
        assert_eq!(complaint.kategori, ComplaintCategory::Tampilan);
        assert_eq!(complaint.prioritas, Priority::Tinggi);
        assert_eq!(complaint.browser_info, None);
    }

    #[test]
    fn missing_and_invalid_fields_are_reported_together() {
        let mut fields = filled();
        fields.kategori = Some("bug".into());
        fields.deskripsi = None;
        fields.judul = Some("x".repeat(256));
        match fields.into_new_complaint() {
            Err(AppError::Validation(errors)) => {
                assert!(errors.contains_key("kategori"));
                assert!(errors.contains_key("deskripsi"));
                assert!(errors.contains_key("judul"));
                assert!(!errors.contains_key("prioritas"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
