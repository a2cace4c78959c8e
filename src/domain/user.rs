//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::lockout::LoginState;
use crate::config::{ROLE_ADMIN, ROLE_KADER};

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Kader,
}

impl UserRole {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => UserRole::Admin,
            _ => UserRole::Kader,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Admin => write!(f, "{}", ROLE_ADMIN),
            UserRole::Kader => write!(f, "{}", ROLE_KADER),
        }
    }
}

/// User domain entity with NIK and phone already decrypted.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub nik: Option<String>,
    pub nik_hash: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub failed_login_attempts: i32,
    pub locked_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Lockout fields as last read from the store.
    pub fn login_state(&self) -> LoginState {
        LoginState {
            failed_attempts: self.failed_login_attempts,
            locked_until: self.locked_until,
        }
    }
}

/// Data needed to insert a user. Plaintext NIK/phone are encrypted by the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub nik: String,
    pub nik_hash: String,
    pub phone_number: Option<String>,
}

/// Profile fields a user may change about themselves.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileUpdate {
    #[schema(example = "Siti Aminah")]
    pub name: Option<String>,
    #[schema(example = "081234567890")]
    pub phone_number: Option<String>,
    #[schema(example = "https://example.com/avatar.png")]
    pub avatar_url: Option<String>,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "Siti Aminah")]
    pub name: String,
    #[schema(example = "siti@posyandu.id")]
    pub email: String,
    #[schema(example = "kader")]
    pub role: UserRole,
    #[schema(example = "3201010101010001")]
    pub nik: Option<String>,
    pub phone_number: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            nik: user.nik,
            phone_number: user.phone_number,
            avatar_url: user.avatar_url,
            created_at: user.created_at,
        }
    }
}

/// Authenticated caller, threaded explicitly through service calls.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
    /// Identifier of the presented access token
    pub token_id: Uuid,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_roles_fall_back_to_kader() {
        assert_eq!(UserRole::from("admin"), UserRole::Admin);
        assert_eq!(UserRole::from("kader"), UserRole::Kader);
        assert_eq!(UserRole::from("superuser"), UserRole::Kader);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Kader).unwrap(), "\"kader\"");
        assert_eq!(UserRole::Admin.to_string(), "admin");
    }
}
