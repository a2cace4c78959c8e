//! Issued access tokens. A bearer token is honoured only while its `jti`
//! row exists and has not expired.

use async_trait::async_trait;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use super::entities::access_token::{self, ActiveModel, Entity as TokenEntity};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a freshly issued token.
    async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Whether token `id` belongs to `user_id` and is unexpired at `now`.
    /// Marks the token as used when it is.
    async fn validate(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke one token. Returns whether it existed.
    async fn revoke(&self, id: Uuid) -> AppResult<bool>;
}

pub struct TokenStore {
    db: Arc<DatabaseConnection>,
}

impl TokenStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenRepository for TokenStore {
    async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: String,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        ActiveModel {
            id: Set(id),
            user_id: Set(user_id),
            name: Set(name),
            last_used_at: Set(None),
            expires_at: Set(expires_at),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await?;
        Ok(())
    }

    async fn validate(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = TokenEntity::update_many()
            .col_expr(access_token::Column::LastUsedAt, Expr::value(Some(now)))
            .filter(access_token::Column::Id.eq(id))
            .filter(access_token::Column::UserId.eq(user_id))
            .filter(access_token::Column::ExpiresAt.gt(now))
            .exec(self.db.as_ref())
            .await?;
        Ok(result.rows_affected == 1)
    }

    async fn revoke(&self, id: Uuid) -> AppResult<bool> {
        let result = TokenEntity::delete_by_id(id).exec(self.db.as_ref()).await?;
        Ok(result.rows_affected > 0)
    }
}
