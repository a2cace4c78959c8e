//! Application settings loaded from environment variables.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, DEFAULT_UPLOAD_DIR, FIELD_ENCRYPTION_KEY_LENGTH, MIN_JWT_SECRET_LENGTH,
};

/// Development-only key (base64 of 32 bytes). Never used in release builds.
const DEV_FIELD_ENCRYPTION_KEY: &str = "ZGV2LWZpZWxkLWtleS1ub3QtZm9yLXByb2R1Y3Rpb24=";

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub server_host: String,
    pub server_port: u16,
    field_encryption_key: [u8; FIELD_ENCRYPTION_KEY_LENGTH],
    pub upload_dir: PathBuf,
    /// Peers allowed to name the client in `X-Forwarded-For`/`X-Real-IP`.
    /// Empty means forwarded headers are ignored.
    pub trusted_proxy_ips: Vec<IpAddr>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("field_encryption_key", &"[REDACTED]")
            .field("upload_dir", &self.upload_dir)
            .field("trusted_proxy_ips", &self.trusted_proxy_ips)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET or FIELD_ENCRYPTION_KEY is missing in a release
    /// build, or if either is malformed.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let encoded_key = env::var("FIELD_ENCRYPTION_KEY").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!(
                    "FIELD_ENCRYPTION_KEY not set, using insecure default for development"
                );
                DEV_FIELD_ENCRYPTION_KEY.to_string()
            } else {
                panic!("FIELD_ENCRYPTION_KEY environment variable must be set in production");
            }
        });

        let field_encryption_key = match decode_key(&encoded_key) {
            Some(key) => key,
            None => panic!(
                "FIELD_ENCRYPTION_KEY must be base64 encoding of exactly {} bytes",
                FIELD_ENCRYPTION_KEY_LENGTH
            ),
        };

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            field_encryption_key,
            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            trusted_proxy_ips: env::var("TRUSTED_PROXY_IPS")
                .map(|v| parse_ip_list(&v))
                .unwrap_or_default(),
        }
    }

    /// Build a configuration for tests without touching the environment.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn for_tests() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: "test-secret-key-minimum-32-characters".to_string(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            field_encryption_key: [7u8; FIELD_ENCRYPTION_KEY_LENGTH],
            upload_dir: std::env::temp_dir().join("posyandu-test-uploads"),
            trusted_proxy_ips: Vec::new(),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Key used to encrypt NIK and phone columns at rest.
    pub fn field_encryption_key(&self) -> &[u8; FIELD_ENCRYPTION_KEY_LENGTH] {
        &self.field_encryption_key
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn decode_key(encoded: &str) -> Option<[u8; FIELD_ENCRYPTION_KEY_LENGTH]> {
    let bytes = STANDARD.decode(encoded.trim()).ok()?;
    bytes.try_into().ok()
}

/// Comma-separated addresses; entries that do not parse are skipped with a warning.
fn parse_ip_list(raw: &str) -> Vec<IpAddr> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| match entry.parse() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::warn!(entry, "Ignoring invalid TRUSTED_PROXY_IPS entry");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_key_decodes_to_32_bytes() {
        assert!(decode_key(DEV_FIELD_ENCRYPTION_KEY).is_some());
    }

    #[test]
    fn short_key_is_rejected() {
        assert!(decode_key("c2hvcnQ=").is_none());
        assert!(decode_key("not base64!").is_none());
    }

    #[test]
    fn trusted_proxy_list_skips_garbage() {
        let ips = parse_ip_list(" 10.0.0.1, not-an-ip,,::1 ");
        assert_eq!(
            ips,
            vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse().unwrap()]
        );
    }

    #[test]
    fn debug_redacts_secrets() {
        let rendered = format!("{:?}", Config::for_tests());
        assert!(!rendered.contains("test-secret-key"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
