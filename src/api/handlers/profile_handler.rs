//! Profile handlers for the authenticated user.

use axum::{
    extract::{Extension, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{PERSON_NAME, PHONE_NUMBER};
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CurrentUser, ProfileUpdate, UserResponse};
use crate::errors::AppResult;
use crate::types::ApiResponse;

/// Profile update request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(
        length(min = 1, max = 255, message = "Nama wajib diisi, maksimal 255 karakter"),
        regex(path = *PERSON_NAME, message = "Nama hanya boleh berisi huruf, spasi, titik, apostrof, dan tanda hubung")
    )]
    #[schema(example = "Siti Aminah")]
    pub name: Option<String>,
    #[validate(
        length(max = 20, message = "Nomor telepon maksimal 20 karakter"),
        regex(path = *PHONE_NUMBER, message = "Format nomor telepon tidak valid")
    )]
    pub phone_number: Option<String>,
    #[validate(length(max = 2048, message = "URL avatar terlalu panjang"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Password saat ini wajib diisi"))]
    pub current_password: String,
    #[validate(
        length(min = 8, max = 128, message = "Password minimal 8 dan maksimal 128 karakter"),
        must_match(other = "new_password_confirmation", message = "Konfirmasi password tidak cocok")
    )]
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DeleteAccountRequest {
    /// Must be exactly `HAPUS AKUN`
    #[schema(example = "HAPUS AKUN")]
    pub confirmation: String,
}

/// Create profile routes
pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).put(update_profile).delete(delete_account),
        )
        .route("/profile/password", put(change_password))
}

/// Current user profile
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let user = state.account_service.profile(&current_user).await?;
    Ok(ApiResponse::success(UserResponse::from(user)))
}

/// Update name, phone number or avatar
#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated successfully", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn update_profile(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdateProfileRequest>,
) -> AppResult<ApiResponse<UserResponse>> {
    let update = ProfileUpdate {
        name: payload.name.map(|n| n.trim().to_string()),
        phone_number: payload.phone_number,
        avatar_url: payload.avatar_url,
    };

    let user = state
        .account_service
        .update_profile(&current_user, update)
        .await?;
    Ok(ApiResponse::with_message(
        UserResponse::from(user),
        "Profile updated successfully",
    ))
}

/// Change password after confirming the current one
#[utoipa::path(
    put,
    path = "/api/profile/password",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed successfully"),
        (status = 400, description = "Current password does not match"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn change_password(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .account_service
        .change_password(&current_user, payload.current_password, payload.new_password)
        .await?;
    Ok(ApiResponse::message("Password changed successfully"))
}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Confirmation phrase does not match")
    )
)]
pub async fn delete_account(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<DeleteAccountRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .account_service
        .delete_account(&current_user, &payload.confirmation)
        .await?;
    Ok(ApiResponse::message("Account deleted successfully"))
}
