//! Stored image paths of a complaint.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "pengaduan_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub pengaduan_id: i64,
    pub path: String,
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
}

impl Related<super::pengaduan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pengaduan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
