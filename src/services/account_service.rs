//! Self-service account operations for the authenticated user.
//!
//! None of these paths touch the login failure counter or lock.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;
use std::sync::Arc;

use crate::config::ACCOUNT_DELETION_PHRASE;
use crate::domain::{CurrentUser, Password, ProfileUpdate, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountService: Send + Sync {
    async fn profile(&self, actor: &CurrentUser) -> AppResult<User>;

    async fn update_profile(&self, actor: &CurrentUser, update: ProfileUpdate) -> AppResult<User>;

    /// Replace the password after checking the current one.
    async fn change_password(
        &self,
        actor: &CurrentUser,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Delete the caller's account once `confirmation` matches the phrase.
    async fn delete_account(&self, actor: &CurrentUser, confirmation: &str) -> AppResult<()>;
}

pub struct AccountManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> AccountManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn load(&self, actor: &CurrentUser) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(actor.id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}

#[async_trait]
impl<U: UnitOfWork> AccountService for AccountManager<U> {
    async fn profile(&self, actor: &CurrentUser) -> AppResult<User> {
        self.load(actor).await
    }

    async fn update_profile(&self, actor: &CurrentUser, update: ProfileUpdate) -> AppResult<User> {
        let user = self.uow.users().update_profile(actor.id, update).await?;
        tracing::info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }

    async fn change_password(
        &self,
        actor: &CurrentUser,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let user = self.load(actor).await?;
        if !Password::from_hash(user.password_hash).verify(&current_password) {
            return Err(AppError::bad_request("Password saat ini tidak sesuai"));
        }

        let password_hash = Password::new(&new_password)?.into_string();
        self.uow
            .users()
            .update_password(actor.id, password_hash)
            .await?;
        tracing::info!(user_id = %actor.id, "Password changed");
        Ok(())
    }

    async fn delete_account(&self, actor: &CurrentUser, confirmation: &str) -> AppResult<()> {
        if confirmation != ACCOUNT_DELETION_PHRASE {
            return Err(AppError::validation(
                "confirmation",
                format!("Ketik \"{}\" untuk mengonfirmasi", ACCOUNT_DELETION_PHRASE),
            ));
        }

        // Tokens and complaints go with the row (ON DELETE CASCADE); visits
        // keep their data with created_by set to NULL.
        self.uow.users().delete(actor.id).await?;
        tracing::info!(user_id = %actor.id, "Account deleted");
        Ok(())
    }
}
