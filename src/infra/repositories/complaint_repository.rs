//! Complaint repository. Soft-deleted tickets are filtered out of every read.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, DatabaseConnection,
    EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::entities::{pengaduan, pengaduan_image, pengaduan_response, user};
use crate::domain::{
    Complaint, ComplaintDetails, ComplaintListItem, ComplaintQuery, ComplaintResponse,
    ComplaintStatus, NewComplaint, UserRef,
};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ComplaintRepository: Send + Sync {
    /// Insert a ticket with its stored image paths in one transaction.
    async fn create(
        &self,
        user_id: Uuid,
        complaint: NewComplaint,
        images: Vec<String>,
    ) -> AppResult<Complaint>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Complaint>>;

    /// Ticket with owner, images and replies (oldest first).
    async fn find_details(&self, id: i64) -> AppResult<Option<ComplaintDetails>>;

    /// Newest first, with owner, images and reply count per row.
    async fn list(
        &self,
        query: ComplaintQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<ComplaintListItem>, u64)>;

    async fn update_status(&self, id: i64, status: ComplaintStatus) -> AppResult<Complaint>;

    async fn add_response(
        &self,
        id: i64,
        admin_id: Uuid,
        response: String,
    ) -> AppResult<ComplaintResponse>;

    /// Live tickets per status.
    async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>>;

    async fn soft_delete(&self, id: i64) -> AppResult<()>;
}

pub struct ComplaintStore {
    db: Arc<DatabaseConnection>,
}

impl ComplaintStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    async fn find_live(&self, id: i64) -> AppResult<Option<pengaduan::Model>> {
        Ok(pengaduan::Entity::find_by_id(id)
            .filter(pengaduan::Column::DeletedAt.is_null())
            .one(self.db.as_ref())
            .await?)
    }

    async fn user_refs(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, UserRef>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(user::Entity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|u| (u.id, UserRef { id: u.id, name: u.name }))
            .collect())
    }

    async fn images_of(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, Vec<String>>> {
        let mut images: HashMap<i64, Vec<String>> = HashMap::new();
        if ids.is_empty() {
            return Ok(images);
        }
        for image in pengaduan_image::Entity::find()
            .filter(pengaduan_image::Column::PengaduanId.is_in(ids))
            .order_by_asc(pengaduan_image::Column::Id)
            .all(self.db.as_ref())
            .await?
        {
            images.entry(image.pengaduan_id).or_default().push(image.path);
        }
        Ok(images)
    }

    async fn response_counts(&self, ids: Vec<i64>) -> AppResult<HashMap<i64, u64>> {
        #[derive(FromQueryResult)]
        struct Count {
            pengaduan_id: i64,
            total: i64,
        }

        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(pengaduan_response::Entity::find()
            .select_only()
            .column(pengaduan_response::Column::PengaduanId)
            .column_as(pengaduan_response::Column::Id.count(), "total")
            .filter(pengaduan_response::Column::PengaduanId.is_in(ids))
            .group_by(pengaduan_response::Column::PengaduanId)
            .into_model::<Count>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| (row.pengaduan_id, row.total.max(0) as u64))
            .collect())
    }
}

fn list_condition(query: &ComplaintQuery) -> Condition {
    let mut condition = Condition::all().add(pengaduan::Column::DeletedAt.is_null());
    if let Some(owner) = query.owner {
        condition = condition.add(pengaduan::Column::UserId.eq(owner));
    }
    if let Some(status) = query.status {
        condition = condition.add(pengaduan::Column::Status.eq(status.as_str()));
    }
    if let Some(kategori) = query.kategori {
        condition = condition.add(pengaduan::Column::Kategori.eq(kategori.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", search.to_lowercase());
        condition = condition.add(
            Condition::any()
                .add(Expr::expr(Func::lower(Expr::col(pengaduan::Column::Judul))).like(&pattern))
                .add(
                    Expr::expr(Func::lower(Expr::col(pengaduan::Column::Deskripsi)))
                        .like(&pattern),
                ),
        );
    }
    condition
}

#[async_trait]
impl ComplaintRepository for ComplaintStore {
    async fn create(
        &self,
        user_id: Uuid,
        complaint: NewComplaint,
        images: Vec<String>,
    ) -> AppResult<Complaint> {
        let txn = self.db.begin().await?;
        let now = Utc::now();

        let model = pengaduan::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            kategori: Set(complaint.kategori.as_str().to_string()),
            prioritas: Set(complaint.prioritas.as_str().to_string()),
            judul: Set(complaint.judul),
            deskripsi: Set(complaint.deskripsi),
            langkah_reproduksi: Set(complaint.langkah_reproduksi),
            browser_info: Set(complaint.browser_info),
            status: Set(ComplaintStatus::Pending.as_str().to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;

        if !images.is_empty() {
            pengaduan_image::Entity::insert_many(images.into_iter().map(|path| {
                pengaduan_image::ActiveModel {
                    id: NotSet,
                    pengaduan_id: Set(model.id),
                    path: Set(path),
                    created_at: Set(now),
                }
            }))
            .exec(&txn)
            .await?;
        }

        txn.commit().await?;
        Complaint::try_from(model)
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<Complaint>> {
        self.find_live(id).await?.map(Complaint::try_from).transpose()
    }

    async fn find_details(&self, id: i64) -> AppResult<Option<ComplaintDetails>> {
        let Some(model) = self.find_live(id).await? else {
            return Ok(None);
        };

        let replies = pengaduan_response::Entity::find()
            .filter(pengaduan_response::Column::PengaduanId.eq(id))
            .order_by_asc(pengaduan_response::Column::CreatedAt)
            .order_by_asc(pengaduan_response::Column::Id)
            .all(self.db.as_ref())
            .await?;

        let mut people: Vec<Uuid> = replies.iter().filter_map(|r| r.admin_id).collect();
        people.push(model.user_id);
        let users = self.user_refs(people).await?;

        let responses = replies
            .into_iter()
            .map(|reply| ComplaintResponse {
                id: reply.id,
                admin: reply.admin_id.and_then(|admin| users.get(&admin).cloned()),
                response: reply.response,
                created_at: reply.created_at,
            })
            .collect();

        Ok(Some(ComplaintDetails {
            user: users.get(&model.user_id).cloned(),
            images: self.images_of(vec![id]).await?.remove(&id).unwrap_or_default(),
            complaint: Complaint::try_from(model)?,
            responses,
        }))
    }

    async fn list(
        &self,
        query: ComplaintQuery,
        page: PaginationParams,
    ) -> AppResult<(Vec<ComplaintListItem>, u64)> {
        let paginator = pengaduan::Entity::find()
            .filter(list_condition(&query))
            .order_by_desc(pengaduan::Column::CreatedAt)
            .order_by_desc(pengaduan::Column::Id)
            .paginate(self.db.as_ref(), page.per_page);
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(page.page - 1).await?;

        let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
        let users = self
            .user_refs(models.iter().map(|m| m.user_id).collect())
            .await?;
        let mut images = self.images_of(ids.clone()).await?;
        let counts = self.response_counts(ids).await?;

        let items = models
            .into_iter()
            .map(|model| {
                Ok(ComplaintListItem {
                    user: users.get(&model.user_id).cloned(),
                    images: images.remove(&model.id).unwrap_or_default(),
                    responses_count: counts.get(&model.id).copied().unwrap_or(0),
                    complaint: Complaint::try_from(model)?,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        Ok((items, total))
    }

    async fn update_status(&self, id: i64, status: ComplaintStatus) -> AppResult<Complaint> {
        let model = self
            .find_live(id)
            .await?
            .ok_or(AppError::NotFound("Pengaduan"))?;

        let mut active: pengaduan::ActiveModel = model.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(Utc::now());

        Complaint::try_from(active.update(self.db.as_ref()).await?)
    }

    async fn add_response(
        &self,
        id: i64,
        admin_id: Uuid,
        response: String,
    ) -> AppResult<ComplaintResponse> {
        if self.find_live(id).await?.is_none() {
            return Err(AppError::NotFound("Pengaduan"));
        }

        let reply = pengaduan_response::ActiveModel {
            id: NotSet,
            pengaduan_id: Set(id),
            admin_id: Set(Some(admin_id)),
            response: Set(response),
            created_at: Set(Utc::now()),
        }
        .insert(self.db.as_ref())
        .await?;

        let admin = self.user_refs(vec![admin_id]).await?.remove(&admin_id);
        Ok(ComplaintResponse {
            id: reply.id,
            admin,
            response: reply.response,
            created_at: reply.created_at,
        })
    }

    async fn count_by_status(&self) -> AppResult<Vec<(ComplaintStatus, u64)>> {
        #[derive(FromQueryResult)]
        struct Count {
            status: String,
            total: i64,
        }

        pengaduan::Entity::find()
            .select_only()
            .column(pengaduan::Column::Status)
            .column_as(pengaduan::Column::Id.count(), "total")
            .filter(pengaduan::Column::DeletedAt.is_null())
            .group_by(pengaduan::Column::Status)
            .into_model::<Count>()
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .map(|row| Ok((row.status.parse()?, row.total.max(0) as u64)))
            .collect()
    }

    async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let result = pengaduan::Entity::update_many()
            .col_expr(pengaduan::Column::DeletedAt, Expr::value(Some(Utc::now())))
            .filter(pengaduan::Column::Id.eq(id))
            .filter(pengaduan::Column::DeletedAt.is_null())
            .exec(self.db.as_ref())
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound("Pengaduan"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(query: &ComplaintQuery) -> String {
        pengaduan::Entity::find()
            .filter(list_condition(query))
            .build(DbBackend::Postgres)
            .to_string()
    }

    #[test]
    fn soft_deleted_rows_are_always_excluded() {
        assert!(sql(&ComplaintQuery::default()).contains("\"deleted_at\" IS NULL"));
    }

    #[test]
    fn owner_scope_and_search_apply() {
        let owner = Uuid::nil();
        let statement = sql(&ComplaintQuery {
            owner: Some(owner),
            status: Some(ComplaintStatus::InProgress),
            search: Some("Simpan".into()),
            ..Default::default()
        });
        assert!(statement.contains(&owner.to_string()));
        assert!(statement.contains("'in_progress'"));
        assert!(statement.contains("LOWER(\"judul\") LIKE '%simpan%'"));
        assert!(statement.contains("LOWER(\"deskripsi\") LIKE '%simpan%'"));
    }
}
