//! Bearer token authentication middleware.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::api::AppState;
use crate::errors::AppError;

/// Resolve the bearer token into a `CurrentUser` request extension.
///
/// Handlers behind this layer take `Extension<CurrentUser>` and pass it to
/// services explicitly. A missing, expired or revoked token, or a token
/// whose user was deleted, is a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(TypedHeader(Authorization(bearer))) = bearer else {
        tracing::debug!(path = %request.uri().path(), "Request without bearer token");
        return Err(AppError::Unauthorized);
    };

    let current_user = state.auth_service.authenticate(bearer.token()).await?;
    tracing::debug!(
        user_id = %current_user.id,
        role = %current_user.role,
        "Authenticated request"
    );

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}
