//! National identity number (NIK) value object.
//!
//! A NIK is stored twice: reversibly encrypted for display, and as a
//! deterministic SHA-256 hex digest for equality lookups. Both are derived
//! from the same plaintext at the same write.

use sha2::{Digest, Sha256};

use crate::config::NIK_LENGTH;
use crate::errors::{AppError, AppResult};

/// A syntactically valid 16-digit NIK.
#[derive(Clone, PartialEq, Eq)]
pub struct Nik(String);

impl std::fmt::Debug for Nik {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Keep the region prefix only
        write!(f, "Nik({}**********)", &self.0[..6])
    }
}

impl Nik {
    /// Parse a NIK, rejecting anything that is not exactly 16 ASCII digits.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        if is_nik(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(AppError::validation(
                "nik",
                format!("NIK harus {} digit angka", NIK_LENGTH),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup hash of this NIK.
    pub fn hash(&self) -> String {
        hash_nik(&self.0)
    }
}

/// True when `raw` is exactly `NIK_LENGTH` ASCII digits.
pub fn is_nik(raw: &str) -> bool {
    raw.len() == NIK_LENGTH && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Lowercase hex SHA-256 of the plaintext NIK.
pub fn hash_nik(plain: &str) -> String {
    hex::encode(Sha256::digest(plain.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = hash_nik("1111111111111111");
        let b = hash_nik("1111111111111111");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_matches_known_sha256() {
        // sha256("1234567890123456")
        assert_eq!(
            hash_nik("1234567890123456"),
            "7a51d064a1a216a692f753fcdab276e4ff201a01d8b66f56d50d4d719fd0dc87"
        );
    }

    #[test]
    fn distinct_niks_hash_differently() {
        assert_ne!(hash_nik("1111111111111111"), hash_nik("1111111111111112"));
    }

    #[test]
    fn parse_accepts_only_sixteen_digits() {
        assert!(Nik::parse("3201010101010001").is_ok());
        assert!(Nik::parse(" 3201010101010001 ").is_ok());
        assert!(Nik::parse("320101010101000").is_err());
        assert!(Nik::parse("32010101010100011").is_err());
        assert!(Nik::parse("32010101010100a1").is_err());
    }

    #[test]
    fn debug_masks_digits() {
        let nik = Nik::parse("3201010101010001").unwrap();
        assert_eq!(format!("{nik:?}"), "Nik(320101**********)");
    }
}
