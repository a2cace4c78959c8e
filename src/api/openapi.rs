//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    auth_handler, complaint_handler, dashboard_handler, participant_handler, profile_handler,
    visit_handler,
};
use crate::domain::{
    CategoryCounts, ComplaintCategory, ComplaintStats, ComplaintStatus, DashboardStats,
    ExtensionFields, JenisKelamin, Kategori, Lokasi, MonthlyRegistrations, MonthlyVisits,
    ParticipantSort, ParticipantSummary, Priority, SortOrder, UserResponse, UserRole,
    VisitDetailFields,
};
use crate::domain::visit::{HasilTes, Imt, KesimpulanBb, TingkatKemandirian};
use crate::services::{AuthSession, TokenResponse};

/// OpenAPI documentation for the posyandu API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Posyandu API",
        version = "0.1.0",
        description = "Record keeping for community health posts: participants, visits, complaints and dashboards",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::forgot_password,
        auth_handler::logout,
        // Profile endpoints
        profile_handler::get_profile,
        profile_handler::update_profile,
        profile_handler::change_password,
        profile_handler::delete_account,
        // Participant endpoints
        participant_handler::list_participants,
        participant_handler::participant_summary,
        participant_handler::create_participant,
        participant_handler::get_participant,
        participant_handler::update_participant,
        participant_handler::delete_participant,
        participant_handler::bulk_delete_participants,
        participant_handler::latest_visit,
        // Visit endpoints
        visit_handler::list_visits,
        visit_handler::create_visit,
        visit_handler::get_visit,
        visit_handler::update_visit,
        visit_handler::delete_visit,
        // Dashboard endpoints
        dashboard_handler::stats,
        dashboard_handler::visit_chart,
        dashboard_handler::registration_chart,
        // Complaint endpoints
        complaint_handler::create_complaint,
        complaint_handler::list_complaints,
        complaint_handler::get_complaint,
        complaint_handler::update_status,
        complaint_handler::add_response,
        complaint_handler::complaint_stats,
        complaint_handler::delete_complaint,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            Kategori,
            JenisKelamin,
            Lokasi,
            ParticipantSort,
            SortOrder,
            ExtensionFields,
            VisitDetailFields,
            KesimpulanBb,
            Imt,
            HasilTes,
            TingkatKemandirian,
            ParticipantSummary,
            CategoryCounts,
            DashboardStats,
            MonthlyVisits,
            MonthlyRegistrations,
            ComplaintCategory,
            ComplaintStatus,
            Priority,
            ComplaintStats,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::ForgotPasswordRequest,
            TokenResponse,
            AuthSession,
            // Request bodies
            profile_handler::UpdateProfileRequest,
            profile_handler::ChangePasswordRequest,
            profile_handler::DeleteAccountRequest,
            participant_handler::CreateParticipantRequest,
            participant_handler::UpdateParticipantRequest,
            participant_handler::BulkDeleteRequest,
            visit_handler::CreateVisitRequest,
            visit_handler::UpdateVisitRequest,
            complaint_handler::CreateComplaintForm,
            complaint_handler::UpdateStatusRequest,
            complaint_handler::AddResponseRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, logout and password reset"),
        (name = "Profile", description = "The authenticated user's own account"),
        (name = "Peserta", description = "Participants and their category data"),
        (name = "Kunjungan", description = "Visits and examination records"),
        (name = "Dashboard", description = "Aggregate counts and charts"),
        (name = "Pengaduan", description = "Complaint tickets")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token obtained from /api/login"))
                        .build(),
                ),
            );
        }
    }
}
