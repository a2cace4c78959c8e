//! Repository layer - Data access abstraction
//!
//! Each aggregate has a trait (mocked in tests) and a sea-orm backed store.
//! Writes that must span a master row and its category detail are exposed
//! as connection-generic functions so the unit of work can run them inside
//! one transaction.

mod complaint_repository;
pub(crate) mod entities;
pub(crate) mod extension;
pub(crate) mod participant_repository;
mod report_repository;
mod token_repository;
mod user_repository;
pub(crate) mod visit_repository;

pub use complaint_repository::{ComplaintRepository, ComplaintStore};
pub use extension::{update_extension, CategoryExtension};
pub use participant_repository::{ParticipantRepository, ParticipantStore};
pub use report_repository::{ReportRepository, ReportStore};
pub use token_repository::{TokenRepository, TokenStore};
pub use user_repository::{UserRepository, UserStore};
pub use visit_repository::{VisitRepository, VisitStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use complaint_repository::MockComplaintRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use participant_repository::MockParticipantRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use report_repository::MockReportRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use token_repository::MockTokenRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use visit_repository::MockVisitRepository;
