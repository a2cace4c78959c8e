//! HTTP request handlers.

use once_cell::sync::Lazy;
use regex::Regex;

pub mod auth_handler;
pub mod complaint_handler;
pub mod dashboard_handler;
pub mod participant_handler;
pub mod profile_handler;
pub mod visit_handler;

pub use auth_handler::{login_routes, password_routes, register_routes, session_routes};
pub use complaint_handler::complaint_routes;
pub use dashboard_handler::dashboard_routes;
pub use participant_handler::participant_routes;
pub use profile_handler::profile_routes;
pub use visit_handler::visit_routes;

/// Letters, spaces and `.'-` only.
pub(crate) static PERSON_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z\s.'-]+$").expect("valid name regex"));

/// Digits, spaces, `+` and `-`.
pub(crate) static PHONE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9\s+-]+$").expect("valid phone regex"));

/// Exactly sixteen digits.
pub(crate) static NIK_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{16}$").expect("valid nik regex"));
