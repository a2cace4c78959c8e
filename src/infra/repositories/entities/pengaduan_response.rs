//! Admin replies on a complaint, ordered by insertion.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pengaduan_responses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pengaduan_id: i64,
    pub admin_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub response: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::pengaduan::Entity",
        from = "Column::PengaduanId",
        to = "super::pengaduan::Column::Id",
        on_delete = "Cascade"
    )]
    Pengaduan,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AdminId",
        to = "super::user::Column::Id",
        on_delete = "SetNull"
    )]
    Admin,
}

impl Related<super::pengaduan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pengaduan.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Admin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
