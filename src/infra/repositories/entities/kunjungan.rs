//! Visit master table.

use sea_orm::entity::prelude::*;

use crate::domain::{Lokasi, Visit};
use crate::errors::AppResult;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kunjungan")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub peserta_id: i64,
    pub tanggal_kunjungan: Date,
    pub berat_badan: Option<f64>,
    pub rujuk: bool,
    pub lokasi: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::peserta::Entity",
        from = "Column::PesertaId",
        to = "super::peserta::Column::Id",
        on_delete = "Cascade"
    )]
    Peserta,
}

impl Related<super::peserta::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Peserta.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Visit {
    type Error = crate::errors::AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(Visit {
            id: model.id,
            peserta_id: model.peserta_id,
            tanggal_kunjungan: model.tanggal_kunjungan,
            berat_badan: model.berat_badan,
            rujuk: model.rujuk,
            lokasi: model.lokasi.parse::<Lokasi>()?,
            created_by: model.created_by,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
