//! Integration tests for API endpoints.
//!
//! These tests use mock services to test API endpoints without requiring
//! actual database or Redis connections.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use posyandu_api::api::{create_router, AppState};
use posyandu_api::domain::{CategoryCounts, CurrentUser, DashboardStats, UserRole};
use posyandu_api::errors::AppError;
use posyandu_api::infra::{Database, MockRateLimitStore, RateLimitDecision};
use posyandu_api::services::{
    AccountService, AuthService, ComplaintService, DashboardService, MockAccountService,
    MockAuthService, MockComplaintService, MockDashboardService, MockParticipantService,
    MockServiceContainer, MockVisitService, ParticipantService, VisitService,
};

const VALID_TOKEN: &str = "valid-test-token";

// =============================================================================
// Test harness
// =============================================================================

#[derive(Default)]
struct Mocks {
    auth: MockAuthService,
    accounts: MockAccountService,
    participants: MockParticipantService,
    visits: MockVisitService,
    complaints: MockComplaintService,
    dashboard: MockDashboardService,
    limits: MockRateLimitStore,
    database: Option<MockDatabase>,
}

impl Mocks {
    /// Every limiter lets the request through with budget to spare.
    fn allow_all_requests(&mut self) {
        self.limits
            .expect_check_rate_limit()
            .returning(|_, max, window| Ok(RateLimitDecision::evaluate(1, window as i64, max, window)));
    }

    /// `VALID_TOKEN` resolves to a caller with `role`; anything else is 401.
    fn with_session(&mut self, role: UserRole) {
        let caller = CurrentUser {
            id: Uuid::new_v4(),
            email: "kader@posyandu.id".to_string(),
            role,
            token_id: Uuid::new_v4(),
        };
        self.auth.expect_authenticate().returning(move |token| {
            if token == VALID_TOKEN {
                Ok(caller.clone())
            } else {
                Err(AppError::Unauthorized)
            }
        });
    }

    fn into_router(self) -> Router {
        let auth: Arc<dyn AuthService> = Arc::new(self.auth);
        let accounts: Arc<dyn AccountService> = Arc::new(self.accounts);
        let participants: Arc<dyn ParticipantService> = Arc::new(self.participants);
        let visits: Arc<dyn VisitService> = Arc::new(self.visits);
        let complaints: Arc<dyn ComplaintService> = Arc::new(self.complaints);
        let dashboard: Arc<dyn DashboardService> = Arc::new(self.dashboard);

        let mut container = MockServiceContainer::new();
        container.expect_auth().returning(move || auth.clone());
        container.expect_accounts().returning(move || accounts.clone());
        container
            .expect_participants()
            .returning(move || participants.clone());
        container.expect_visits().returning(move || visits.clone());
        container
            .expect_complaints()
            .returning(move || complaints.clone());
        container
            .expect_dashboard()
            .returning(move || dashboard.clone());

        let database = self
            .database
            .unwrap_or_else(|| MockDatabase::new(DatabaseBackend::Postgres))
            .into_connection();

        create_router(AppState::new(
            &container,
            Arc::new(self.limits),
            Arc::new(Database::from_connection(database)),
        ))
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = app.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

fn login_body() -> Value {
    json!({ "identifier": "siti@posyandu.id", "password": "rahasia123" })
}

// =============================================================================
// Root, health and headers
// =============================================================================

#[tokio::test]
async fn test_root_reports_service_with_security_headers() {
    let app = Mocks::default().into_router();

    let (status, headers, body) = send(app, get("/", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "Posyandu API");
    assert_eq!(body["status"], "running");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
}

#[tokio::test]
async fn test_health_is_degraded_when_redis_is_down() {
    let mut mocks = Mocks::default();
    mocks.database = Some(
        MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]),
    );
    mocks
        .limits
        .expect_ping()
        .returning(|| Err(AppError::internal("connection refused")));

    let (status, _, body) = send(mocks.into_router(), get("/health", None)).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["redis"]["status"], "unhealthy");
}

// =============================================================================
// Authentication and the error envelope
// =============================================================================

#[tokio::test]
async fn test_protected_route_without_token_is_unauthorized() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.auth.expect_authenticate().times(0);
    mocks.dashboard.expect_stats().times(0);

    let (status, _, body) = send(mocks.into_router(), get("/api/dashboard/stats", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);

    let (status, _, body) = send(
        mocks.into_router(),
        get("/api/dashboard/stats", Some("forged-token")),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_dashboard_stats_are_wrapped_in_success_envelope() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);
    mocks.dashboard.expect_stats().times(1).returning(|| {
        Ok(DashboardStats {
            total_peserta: 12,
            kunjungan_hari_ini: 3,
            kategori: CategoryCounts {
                balita: 5,
                lansia: 7,
                ..Default::default()
            },
        })
    });

    let (status, headers, body) = send(
        mocks.into_router(),
        get("/api/dashboard/stats", Some(VALID_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["total_peserta"], 12);
    assert_eq!(body["data"]["kategori"]["lansia"], 7);
    assert_eq!(body["data"]["kategori"]["bumil"], 0);
    assert!(headers.contains_key("x-ratelimit-remaining"));
}

#[tokio::test]
async fn test_wrong_password_reports_attempts_left() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.auth.expect_login().times(1).returning(|_, _| {
        Err(AppError::InvalidCredentials {
            attempts_remaining: Some(4),
        })
    });

    let (status, _, body) = send(mocks.into_router(), post_json("/api/login", None, login_body())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");
    assert_eq!(body["message"], "Password salah. Sisa percobaan: 4.");
}

#[tokio::test]
async fn test_locked_account_is_423() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.auth.expect_login().returning(|_, _| {
        Err(AppError::AccountLocked {
            remaining_minutes: 12,
        })
    });

    let (status, _, body) = send(mocks.into_router(), post_json("/api/login", None, login_body())).await;

    assert_eq!(status, StatusCode::LOCKED);
    assert_eq!(body["code"], "ACCOUNT_LOCKED");
    assert_eq!(body["message"], "Akun terkunci. Silakan coba lagi dalam 12 menit.");
}

#[tokio::test]
async fn test_short_password_fails_validation_before_service() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.auth.expect_login().times(0);

    let (status, _, body) = send(
        mocks.into_router(),
        post_json(
            "/api/login",
            None,
            json!({ "identifier": "siti@posyandu.id", "password": "123" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["errors"]["password"].is_array());
}

// =============================================================================
// Rate limiting
// =============================================================================

#[tokio::test]
async fn test_login_limit_returns_429_with_retry_after() {
    let mut mocks = Mocks::default();
    mocks
        .limits
        .expect_check_rate_limit()
        .withf(|key: &str, max, _| key.starts_with("login:") && *max == 5)
        .returning(|_, max, window| Ok(RateLimitDecision::evaluate(6, 42, max, window)));
    mocks.auth.expect_login().times(0);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-Forwarded-For", "203.0.113.9")
        .body(Body::from(login_body().to_string()))
        .expect("request");

    let (status, headers, body) = send(mocks.into_router(), request).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(headers[header::RETRY_AFTER], "42");
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_eq!(
        body["message"],
        "Terlalu banyak percobaan login. Silakan coba lagi dalam 1 menit."
    );
}

#[tokio::test]
async fn test_forwarded_for_from_direct_client_does_not_change_bucket() {
    let mut mocks = Mocks::default();
    mocks
        .limits
        .expect_check_rate_limit()
        .withf(|key: &str, _, _| key == "login:198.51.100.9")
        .times(2)
        .returning(|_, max, window| Ok(RateLimitDecision::evaluate(6, 30, max, window)));
    mocks.auth.expect_login().times(0);
    let app = mocks.into_router();

    for spoofed in ["1.1.1.1", "2.2.2.2"] {
        let mut request = post_json("/api/login", None, login_body());
        request
            .headers_mut()
            .insert("X-Forwarded-For", spoofed.parse().expect("header value"));
        request.extensions_mut().insert(ConnectInfo(SocketAddr::from((
            [198, 51, 100, 9],
            52000,
        ))));

        let (status, _, _) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }
}

#[tokio::test]
async fn test_unreachable_counter_store_denies_requests() {
    let mut mocks = Mocks::default();
    mocks
        .limits
        .expect_check_rate_limit()
        .returning(|_, _, _| Err(AppError::internal("redis unavailable")));
    mocks.auth.expect_register().times(0);

    let (status, headers, _) = send(
        mocks.into_router(),
        post_json("/api/register", None, json!({})),
    )
    .await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));
}

// =============================================================================
// Resource handlers
// =============================================================================

#[tokio::test]
async fn test_invalid_participant_payload_lists_field_errors() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);
    mocks.participants.expect_create().times(0);

    let (status, _, body) = send(
        mocks.into_router(),
        post_json(
            "/api/peserta",
            Some(VALID_TOKEN),
            json!({
                "nik": "12345",
                "nama": "Mbah Karto",
                "kategori": "lansia",
                "tanggal_lahir": "1950-08-17",
                "jenis_kelamin": "Laki-Laki",
                "rt": "000003",
                "pekerjaan": "Petani"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["nik"][0], "NIK harus 16 digit angka");
    assert_eq!(body["errors"]["rt"][0], "RT maksimal 4 karakter");
}

#[tokio::test]
async fn test_missing_participant_is_404() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);
    mocks
        .participants
        .expect_get()
        .returning(|_| Err(AppError::NotFound("Peserta")));

    let (status, _, body) = send(
        mocks.into_router(),
        get("/api/peserta/404", Some(VALID_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(body["message"], "Peserta not found");
}

#[tokio::test]
async fn test_kader_cannot_read_complaint_stats() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);
    mocks
        .complaints
        .expect_stats()
        .returning(|_| Err(AppError::Forbidden));

    let (status, _, body) = send(
        mocks.into_router(),
        get("/api/pengaduan/stats", Some(VALID_TOKEN)),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_logout_revokes_presented_token() {
    let mut mocks = Mocks::default();
    mocks.allow_all_requests();
    mocks.with_session(UserRole::Kader);
    mocks.auth.expect_logout().times(1).returning(|_| Ok(()));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/logout")
        .header(header::AUTHORIZATION, format!("Bearer {VALID_TOKEN}"))
        .body(Body::empty())
        .expect("request");

    let (status, _, body) = send(mocks.into_router(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}
