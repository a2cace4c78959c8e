//! Reversible field encryption for NIK and phone columns.
//!
//! Values are sealed with AES-256-GCM under a random 96-bit nonce and stored
//! as `base64(nonce || ciphertext)`. Equality lookups never use these
//! columns; they go through the separate deterministic hash.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::{rngs::OsRng, RngCore};

use crate::config::FIELD_ENCRYPTION_KEY_LENGTH;
use crate::errors::{AppError, AppResult};

const NONCE_LENGTH: usize = 12;

/// Symmetric cipher for sensitive columns.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for FieldCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldCipher([REDACTED])")
    }
}

impl FieldCipher {
    pub fn new(key: &[u8; FIELD_ENCRYPTION_KEY_LENGTH]) -> Self {
        let key = Key::<Aes256Gcm>::from_slice(key);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt a plaintext value for storage.
    pub fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        let mut nonce_bytes = [0u8; NONCE_LENGTH];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|_| AppError::internal("Field encryption failed"))?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a stored value.
    pub fn decrypt(&self, stored: &str) -> AppResult<String> {
        let sealed = STANDARD
            .decode(stored)
            .map_err(|_| AppError::internal("Encrypted field is not valid base64"))?;
        if sealed.len() <= NONCE_LENGTH {
            return Err(AppError::internal("Encrypted field is truncated"));
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| AppError::internal("Encrypted field failed authentication"))?;

        String::from_utf8(plaintext)
            .map_err(|_| AppError::internal("Decrypted field is not UTF-8"))
    }

    pub fn encrypt_opt(&self, plaintext: Option<&str>) -> AppResult<Option<String>> {
        plaintext.map(|value| self.encrypt(value)).transpose()
    }

    pub fn decrypt_opt(&self, stored: Option<&str>) -> AppResult<Option<String>> {
        stored.map(|value| self.decrypt(value)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher() -> FieldCipher {
        FieldCipher::new(&[42u8; FIELD_ENCRYPTION_KEY_LENGTH])
    }

    #[test]
    fn decrypts_what_it_encrypts() {
        let cipher = cipher();
        let sealed = cipher.encrypt("3201010101010001").unwrap();
        assert_ne!(sealed, "3201010101010001");
        assert_eq!(cipher.decrypt(&sealed).unwrap(), "3201010101010001");
    }

    #[test]
    fn nonces_make_ciphertexts_differ() {
        let cipher = cipher();
        assert_ne!(
            cipher.encrypt("081234567890").unwrap(),
            cipher.encrypt("081234567890").unwrap()
        );
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = cipher().encrypt("081234567890").unwrap();
        let other = FieldCipher::new(&[1u8; FIELD_ENCRYPTION_KEY_LENGTH]);
        assert!(other.decrypt(&sealed).is_err());
    }

    #[test]
    fn tampered_or_garbage_input_is_rejected() {
        let cipher = cipher();
        assert!(cipher.decrypt("not base64!").is_err());
        assert!(cipher.decrypt("AAAA").is_err());

        let mut sealed = STANDARD.decode(cipher.encrypt("x").unwrap()).unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xff;
        assert!(cipher.decrypt(&STANDARD.encode(sealed)).is_err());
    }

    #[test]
    fn optional_values_pass_through() {
        let cipher = cipher();
        assert_eq!(cipher.encrypt_opt(None).unwrap(), None);
        let sealed = cipher.encrypt_opt(Some("0812")).unwrap();
        assert_eq!(cipher.decrypt_opt(sealed.as_deref()).unwrap().as_deref(), Some("0812"));
    }
}
