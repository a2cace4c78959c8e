//! Authentication service: registration, lockout-aware login, bearer token
//! validation, logout and identity-verified password reset.
//!
//! The failure counter is only ever written from `login`, through a
//! compare-and-set on the value that was read.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, AUTH_TOKEN_NAME, LOCKOUT_CAS_RETRIES, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use crate::domain::{
    hash_nik, CurrentUser, FailureOutcome, LockoutPolicy, LoginIdentifier, LoginState, NewUser, Nik,
    Password, User, UserResponse, UserRole,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// Real argon2 hash verified when no account matches, so unknown
/// identifiers cost the same as wrong passwords.
static DUMMY_HASH: Lazy<String> = Lazy::new(|| {
    Password::new("posyandu-timing-equalizer")
        .map(Password::into_string)
        .unwrap_or_default()
});

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    /// Id of the persisted access token row
    pub jti: Uuid,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// User plus a freshly issued token.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthSession {
    pub user: UserResponse,
    #[serde(flatten)]
    pub token: TokenResponse,
}

/// Validated registration input.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub nik: Nik,
    pub phone_number: Option<String>,
}

/// Validated forgot-password input.
#[derive(Debug, Clone)]
pub struct PasswordReset {
    pub email: String,
    pub nik: String,
    pub phone_number: String,
    pub new_password: String,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a kader account and log it in.
    async fn register(&self, registration: Registration) -> AppResult<AuthSession>;

    /// Log in with an email or NIK identifier.
    async fn login(&self, identifier: String, password: String) -> AppResult<AuthSession>;

    /// Resolve a bearer token into the calling user.
    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser>;

    /// Revoke exactly the token the caller presented.
    async fn logout(&self, actor: &CurrentUser) -> AppResult<()>;

    /// Set a new password after matching NIK and phone number.
    async fn forgot_password(&self, reset: PasswordReset) -> AppResult<()>;
}

pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    policy: LockoutPolicy,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self {
            uow,
            config,
            policy: LockoutPolicy::default(),
        }
    }

    async fn find_by_identifier(&self, identifier: &LoginIdentifier) -> AppResult<Option<User>> {
        match identifier {
            LoginIdentifier::Email(email) => self.uow.users().find_by_email(email).await,
            LoginIdentifier::Nik(nik) => self.uow.users().find_by_nik_hash(&nik.hash()).await,
        }
    }

    async fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);
        let jti = Uuid::new_v4();

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            jti,
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret_bytes()),
        )?;

        self.uow
            .tokens()
            .create(jti, user.id, AUTH_TOKEN_NAME.to_string(), expires_at)
            .await?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.config.jwt_expiration_hours * SECONDS_PER_HOUR,
        })
    }

    async fn session(&self, user: User) -> AppResult<AuthSession> {
        let token = self.issue_token(&user).await?;
        Ok(AuthSession {
            user: UserResponse::from(user),
            token,
        })
    }

    /// Record one wrong password and build the rejection.
    ///
    /// The write only lands if the stored counter still holds the value we
    /// read; on a lost race the account is re-read and the failure applied
    /// to the fresh state.
    async fn reject_password(&self, mut user: User, now: DateTime<Utc>) -> AppError {
        for _ in 0..LOCKOUT_CAS_RETRIES {
            let state = user.login_state();
            let outcome = self.policy.register_failure(&state, now);

            match self
                .uow
                .users()
                .record_login_failure(user.id, state.failed_attempts, outcome.next_state())
                .await
            {
                Ok(true) => {
                    return match outcome {
                        FailureOutcome::Rejected {
                            attempts_remaining, ..
                        } => {
                            tracing::warn!(
                                user_id = %user.id,
                                attempts_remaining,
                                "Failed login attempt"
                            );
                            AppError::InvalidCredentials {
                                attempts_remaining: Some(attempts_remaining),
                            }
                        }
                        FailureOutcome::Locked {
                            remaining_minutes, ..
                        } => {
                            tracing::warn!(user_id = %user.id, "Account locked after failed logins");
                            AppError::AccountLocked { remaining_minutes }
                        }
                    };
                }
                Ok(false) => {
                    tracing::debug!(user_id = %user.id, "Lost failure counter race, re-reading");
                }
                Err(e) => return e,
            }

            user = match self.uow.users().find_by_id(user.id).await {
                Ok(Some(fresh)) => fresh,
                Ok(None) => {
                    return AppError::InvalidCredentials {
                        attempts_remaining: None,
                    }
                }
                Err(e) => return e,
            };
            if let Some(remaining_minutes) =
                self.policy.remaining_lock_minutes(&user.login_state(), now)
            {
                return AppError::AccountLocked { remaining_minutes };
            }
        }

        tracing::warn!(user_id = %user.id, "Failure counter stayed contended");
        AppError::InvalidCredentials {
            attempts_remaining: None,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, registration: Registration) -> AppResult<AuthSession> {
        let email = registration.email.trim().to_lowercase();
        let users = self.uow.users();

        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email"));
        }
        let nik_hash = registration.nik.hash();
        if users.find_by_nik_hash(&nik_hash).await?.is_some() {
            return Err(AppError::conflict("NIK"));
        }

        let password_hash = Password::new(&registration.password)?.into_string();
        let user = users
            .create(NewUser {
                name: registration.name,
                email,
                password_hash,
                role: UserRole::Kader,
                nik: registration.nik.as_str().to_string(),
                nik_hash,
                phone_number: registration.phone_number,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        self.session(user).await
    }

    async fn login(&self, identifier: String, password: String) -> AppResult<AuthSession> {
        let identifier = LoginIdentifier::parse(&identifier)?;

        let Some(user) = self.find_by_identifier(&identifier).await? else {
            Password::from_hash(DUMMY_HASH.clone()).verify(&password);
            tracing::warn!(
                by_nik = matches!(identifier, LoginIdentifier::Nik(_)),
                "Login attempt for unknown account"
            );
            return Err(AppError::InvalidCredentials {
                attempts_remaining: None,
            });
        };

        let now = Utc::now();
        if let Some(remaining_minutes) = self.policy.remaining_lock_minutes(&user.login_state(), now)
        {
            tracing::warn!(user_id = %user.id, remaining_minutes, "Login attempt on locked account");
            return Err(AppError::AccountLocked { remaining_minutes });
        }

        if !Password::from_hash(user.password_hash.clone()).verify(&password) {
            return Err(self.reject_password(user, now).await);
        }

        if user.login_state() != LoginState::CLEAR {
            self.uow.users().reset_login_state(user.id).await?;
        }

        tracing::info!(user_id = %user.id, "Login succeeded");
        self.session(user).await
    }

    async fn authenticate(&self, token: &str) -> AppResult<CurrentUser> {
        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?
        .claims;

        if !self
            .uow
            .tokens()
            .validate(claims.jti, claims.sub, Utc::now())
            .await?
        {
            tracing::debug!(token_id = %claims.jti, "Token revoked or expired");
            return Err(AppError::Unauthorized);
        }

        let user = self
            .uow
            .users()
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            role: user.role,
            token_id: claims.jti,
        })
    }

    async fn logout(&self, actor: &CurrentUser) -> AppResult<()> {
        self.uow.tokens().revoke(actor.token_id).await?;
        tracing::info!(user_id = %actor.id, token_id = %actor.token_id, "Logged out");
        Ok(())
    }

    async fn forgot_password(&self, reset: PasswordReset) -> AppResult<()> {
        let mismatch = || AppError::bad_request("Data verifikasi tidak cocok");

        let user = self
            .uow
            .users()
            .find_by_email(&reset.email.trim().to_lowercase())
            .await?
            .ok_or_else(mismatch)?;

        let nik_matches = user.nik_hash.as_deref() == Some(hash_nik(reset.nik.trim()).as_str());
        let phone_matches = user.phone_number.as_deref() == Some(reset.phone_number.trim());
        if !nik_matches || !phone_matches {
            tracing::warn!(user_id = %user.id, "Password reset verification failed");
            return Err(mismatch());
        }

        let password_hash = Password::new(&reset.new_password)?.into_string();
        self.uow
            .users()
            .update_password(user.id, password_hash)
            .await?;
        tracing::info!(user_id = %user.id, "Password reset");
        Ok(())
    }
}
