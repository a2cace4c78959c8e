//! Login identifier resolution: an email address or a 16-digit NIK.

use validator::ValidateEmail;

use super::nik::Nik;
use crate::errors::{AppError, AppResult};

/// How a login request names the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginIdentifier {
    Email(String),
    Nik(Nik),
}

impl LoginIdentifier {
    /// Classify a raw identifier. Emails use the same rule as registration,
    /// so every address that could register can log in. Anything that is
    /// neither an email nor a 16-digit NIK never reaches a lookup.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if raw.validate_email() {
            return Ok(Self::Email(raw.to_lowercase()));
        }
        Nik::parse(raw).map(Self::Nik).map_err(|_| {
            AppError::validation(
                "identifier",
                "Identifier harus berupa email yang valid atau NIK 16 digit",
            )
        })
    }
}
