//! Complaint ticket table. Rows with `deleted_at` set are soft-deleted.

use sea_orm::entity::prelude::*;

use crate::domain::Complaint;
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pengaduan")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Uuid,
    pub kategori: String,
    pub prioritas: String,
    pub judul: String,
    #[sea_orm(column_type = "Text")]
    pub deskripsi: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub langkah_reproduksi: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub browser_info: Option<String>,
    pub status: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::pengaduan_image::Entity")]
    Images,
    #[sea_orm(has_many = "super::pengaduan_response::Entity")]
    Responses,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::pengaduan_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Images.def()
    }
}

impl Related<super::pengaduan_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Responses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Complaint {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(Complaint {
            id: model.id,
            user_id: model.user_id,
            kategori: model.kategori.parse()?,
            prioritas: model.prioritas.parse()?,
            judul: model.judul,
            deskripsi: model.deskripsi,
            langkah_reproduksi: model.langkah_reproduksi,
            browser_info: model.browser_info,
            status: model.status.parse()?,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
