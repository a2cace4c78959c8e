//! Application route configuration.

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware,
    response::Json,
    routing::get,
    Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    complaint_routes, dashboard_routes, login_routes, participant_routes, password_routes,
    profile_routes, register_routes, session_routes, visit_routes,
};
use super::middleware::{
    auth_middleware, rate_limit_login_middleware, rate_limit_middleware,
    rate_limit_register_middleware, with_security_headers,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::{MAX_COMPLAINT_IMAGES, MAX_COMPLAINT_IMAGE_BYTES, SERVICE_NAME};

/// Room for every image at its size limit plus the text fields. Oversized
/// single images still reach validation and are reported as 422.
const COMPLAINT_BODY_LIMIT: usize = (MAX_COMPLAINT_IMAGES + 2) * MAX_COMPLAINT_IMAGE_BYTES;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .merge(register_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_register_middleware,
        )))
        .merge(login_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_login_middleware,
        )))
        .merge(password_routes().route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        )));

    // Layers run bottom-up: the limiter counts before authentication.
    let protected = Router::new()
        .merge(session_routes())
        .merge(profile_routes())
        .nest("/peserta", participant_routes())
        .nest("/kunjungan", visit_routes())
        .nest("/dashboard", dashboard_routes())
        .nest(
            "/pengaduan",
            complaint_routes().layer(DefaultBodyLimit::max(COMPLAINT_BODY_LIMIT)),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let router = Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        // OpenAPI Swagger UI documentation
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", public.merge(protected))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    with_security_headers(router)
}

#[derive(Serialize)]
struct RootResponse {
    service: &'static str,
    version: &'static str,
    status: &'static str,
}

/// Root endpoint
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        status: "running",
    })
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

/// Individual service health status
#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

/// Service status
#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self {
                status: "healthy",
                error: None,
            },
            Err(e) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Health check endpoint with database and Redis connectivity check
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (database, redis) = tokio::join!(state.database.ping(), state.rate_limits.ping());
    let database = ServiceStatus::from_result(database);
    let redis = ServiceStatus::from_result(redis);

    let all_healthy = database.is_healthy() && redis.is_healthy();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" },
        services: ServiceHealth { database, redis },
    };

    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}
