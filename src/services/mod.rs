//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on the `UnitOfWork` abstraction for
//! repository access and transactions, and receive the authenticated caller
//! as an explicit argument.

mod account_service;
mod auth_service;
mod complaint_service;
pub mod container;
mod dashboard_service;
mod participant_service;
mod visit_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use account_service::{AccountManager, AccountService};
pub use auth_service::{
    AuthService, AuthSession, Authenticator, Claims, PasswordReset, Registration, TokenResponse,
};
pub use complaint_service::{validate_images, ComplaintManager, ComplaintService, ImageUpload};
pub use dashboard_service::{DashboardManager, DashboardService};
pub use participant_service::{ParticipantManager, ParticipantService};
pub use visit_service::{VisitManager, VisitService};

#[cfg(any(test, feature = "test-utils"))]
pub use account_service::MockAccountService;
#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use complaint_service::MockComplaintService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
#[cfg(any(test, feature = "test-utils"))]
pub use dashboard_service::MockDashboardService;
#[cfg(any(test, feature = "test-utils"))]
pub use participant_service::MockParticipantService;
#[cfg(any(test, feature = "test-utils"))]
pub use visit_service::MockVisitService;
