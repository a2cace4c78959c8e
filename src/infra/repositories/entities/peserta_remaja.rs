//! Adolescent extension of a participant.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::participant::RemajaProfile;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "peserta_remaja")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub peserta_id: i64,
    pub nama_ortu: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub riwayat_keluarga: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub perilaku_berisiko: Option<Json>,
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

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for RemajaProfile {
    fn from(model: Model) -> Self {
        RemajaProfile {
            nama_ortu: model.nama_ortu,
            riwayat_keluarga: model.riwayat_keluarga,
            perilaku_berisiko: model.perilaku_berisiko,
        }
    }
}

impl ActiveModel {
    pub fn from_profile(peserta_id: i64, profile: &RemajaProfile) -> Self {
        Self {
            peserta_id: Set(peserta_id),
            nama_ortu: Set(profile.nama_ortu.clone()),
            riwayat_keluarga: Set(profile.riwayat_keluarga.clone()),
            perilaku_berisiko: Set(profile.perilaku_berisiko.clone()),
        }
    }
}
