//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use super::{NIK_DIGITS, PERSON_NAME, PHONE_NUMBER};
use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::domain::{CurrentUser, Nik};
use crate::errors::AppResult;
use crate::services::{AuthSession, PasswordReset, Registration};
use crate::types::{ApiResponse, Created};

/// Kader self-registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(
        length(min = 1, max = 255, message = "Nama wajib diisi, maksimal 255 karakter"),
        regex(path = *PERSON_NAME, message = "Nama hanya boleh berisi huruf, spasi, titik, apostrof, dan tanda hubung")
    )]
    #[schema(example = "Siti Aminah")]
    pub name: String,
    #[validate(email(message = "Format email tidak valid"))]
    #[schema(example = "siti@posyandu.id")]
    pub email: String,
    #[validate(
        length(min = 8, max = 128, message = "Password minimal 8 dan maksimal 128 karakter"),
        must_match(other = "password_confirmation", message = "Konfirmasi password tidak cocok")
    )]
    #[schema(example = "RahasiaKader1", min_length = 8)]
    pub password: String,
    pub password_confirmation: String,
    #[validate(regex(path = *NIK_DIGITS, message = "NIK harus 16 digit angka"))]
    #[schema(example = "3201010101010001")]
    pub nik: String,
    #[validate(
        length(max = 20, message = "Nomor telepon maksimal 20 karakter"),
        regex(path = *PHONE_NUMBER, message = "Format nomor telepon tidak valid")
    )]
    #[schema(example = "081234567890")]
    pub phone_number: Option<String>,
}

/// Login with an email address or a 16-digit NIK
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email atau NIK wajib diisi"))]
    #[schema(example = "siti@posyandu.id")]
    pub identifier: String,
    #[validate(length(min = 6, max = 128, message = "Password minimal 6 dan maksimal 128 karakter"))]
    #[schema(example = "RahasiaKader1")]
    pub password: String,
}

/// Password reset verified against the stored NIK and phone number
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Format email tidak valid"))]
    pub email: String,
    #[validate(regex(path = *NIK_DIGITS, message = "NIK harus 16 digit angka"))]
    pub nik: String,
    #[validate(length(min = 1, message = "Nomor telepon wajib diisi"))]
    pub phone_number: String,
    #[validate(
        length(min = 8, max = 128, message = "Password minimal 8 dan maksimal 128 karakter"),
        must_match(other = "password_confirmation", message = "Konfirmasi password tidak cocok")
    )]
    pub password: String,
    pub password_confirmation: String,
}

/// `POST /register`, behind the registration limiter.
pub fn register_routes() -> Router<AppState> {
    Router::new().route("/register", post(register))
}

/// `POST /login`, behind the login limiter.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// `POST /forgot-password`
pub fn password_routes() -> Router<AppState> {
    Router::new().route("/forgot-password", post(forgot_password))
}

/// `POST /logout`, requires a bearer token.
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/logout", post(logout))
}

/// Register a new kader account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = AuthSession),
        (status = 409, description = "Email or NIK already registered"),
        (status = 422, description = "Validation error"),
        (status = 429, description = "Too many registration attempts")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<AuthSession>> {
    let registration = Registration {
        name: payload.name.trim().to_string(),
        email: payload.email.trim().to_lowercase(),
        password: payload.password,
        nik: Nik::parse(&payload.nik)?,
        phone_number: payload.phone_number.filter(|p| !p.trim().is_empty()),
    };

    let session = state.auth_service.register(registration).await?;
    Ok(Created(session, "User registered successfully"))
}

/// Login and get a bearer token
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthSession),
        (status = 401, description = "Invalid credentials"),
        (status = 422, description = "Validation error"),
        (status = 423, description = "Account locked"),
        (status = 429, description = "Too many login attempts")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<AuthSession>> {
    let session = state
        .auth_service
        .login(payload.identifier, payload.password)
        .await?;

    Ok(ApiResponse::with_message(session, "Login successful"))
}

/// Reset a forgotten password
#[utoipa::path(
    post,
    path = "/api/forgot-password",
    tag = "Authentication",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Password reset successfully"),
        (status = 400, description = "Verification data does not match"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .auth_service
        .forgot_password(PasswordReset {
            email: payload.email.trim().to_lowercase(),
            nik: payload.nik,
            phone_number: payload.phone_number,
            new_password: payload.password,
        })
        .await?;

    Ok(ApiResponse::message("Password reset successfully"))
}

/// Revoke the presented token
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Logged out successfully"),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn logout(
    Extension(current_user): Extension<CurrentUser>,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.auth_service.logout(&current_user).await?;
    Ok(ApiResponse::message("Logged out successfully"))
}
