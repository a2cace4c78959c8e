//! User repository. NIK and phone number are encrypted on the way in and
//! decrypted on the way out; lookups by NIK go through `nik_hash`.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{LoginState, NewUser, ProfileUpdate, User, UserRole};
use crate::errors::{map_unique_violation, AppError, AppResult, OptionExt};
use crate::infra::crypto::FieldCipher;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by email (already lowercased)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find user by the SHA-256 hex of their NIK
    async fn find_by_nik_hash(&self, nik_hash: &str) -> AppResult<Option<User>>;

    /// Insert a user. Duplicate email or NIK yields a conflict.
    async fn create(&self, user: NewUser) -> AppResult<User>;

    /// Persist `next` only if the stored counter still equals `observed`.
    /// Returns `false` when another writer got there first.
    async fn record_login_failure(&self, id: Uuid, observed: i32, next: LoginState)
        -> AppResult<bool>;

    /// Zero the failure counter and clear any lock.
    async fn reset_login_state(&self, id: Uuid) -> AppResult<()>;

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User>;

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Hard delete; tokens and complaints go with the row.
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: Arc<DatabaseConnection>,
    cipher: FieldCipher,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: Arc<DatabaseConnection>, cipher: FieldCipher) -> Self {
        Self { db, cipher }
    }

    fn to_domain(&self, model: user::Model) -> AppResult<User> {
        Ok(User {
            id: model.id,
            nik: self.cipher.decrypt_opt(model.nik.as_deref())?,
            phone_number: self.cipher.decrypt_opt(model.phone_number.as_deref())?,
            name: model.name,
            email: model.email,
            password_hash: model.password_hash,
            role: UserRole::from(model.role.as_str()),
            nik_hash: model.nik_hash,
            avatar_url: model.avatar_url,
            failed_login_attempts: model.failed_login_attempts,
            locked_until: model.locked_until,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }

    async fn find_one(&self, filter: impl sea_orm::sea_query::IntoCondition) -> AppResult<Option<User>> {
        UserEntity::find()
            .filter(filter)
            .one(self.db.as_ref())
            .await?
            .map(|model| self.to_domain(model))
            .transpose()
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        self.find_one(user::Column::Id.eq(id)).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.find_one(user::Column::Email.eq(email)).await
    }

    async fn find_by_nik_hash(&self, nik_hash: &str) -> AppResult<Option<User>> {
        self.find_one(user::Column::NikHash.eq(nik_hash)).await
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let now = Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(user.name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            role: Set(user.role.to_string()),
            nik: Set(Some(self.cipher.encrypt(&user.nik)?)),
            nik_hash: Set(Some(user.nik_hash)),
            phone_number: Set(self.cipher.encrypt_opt(user.phone_number.as_deref())?),
            avatar_url: Set(None),
            failed_login_attempts: Set(0),
            locked_until: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| map_unique_violation(e, "Email atau NIK"))?;
        self.to_domain(model)
    }

    async fn record_login_failure(
        &self,
        id: Uuid,
        observed: i32,
        next: LoginState,
    ) -> AppResult<bool> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::FailedLoginAttempts, Expr::value(next.failed_attempts))
            .col_expr(user::Column::LockedUntil, Expr::value(next.locked_until))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::FailedLoginAttempts.eq(observed))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn reset_login_state(&self, id: Uuid) -> AppResult<()> {
        UserEntity::update_many()
            .col_expr(user::Column::FailedLoginAttempts, Expr::value(0))
            .col_expr(
                user::Column::LockedUntil,
                Expr::value(Option::<chrono::DateTime<Utc>>::None),
            )
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await?
            .ok_or_not_found("User")?;

        let mut active: ActiveModel = model.into();
        if let Some(name) = update.name {
            active.name = Set(name);
        }
        if let Some(phone) = update.phone_number {
            active.phone_number = Set(Some(self.cipher.encrypt(&phone)?));
        }
        if let Some(avatar_url) = update.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(self.db.as_ref()).await?;
        self.to_domain(model)
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(user::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User"));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id).exec(self.db.as_ref()).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("User"));
        }
        Ok(())
    }
}
