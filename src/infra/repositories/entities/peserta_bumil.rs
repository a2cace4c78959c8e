//! Pregnancy extension of a participant, keyed by the participant id.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::participant::BumilProfile;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "peserta_bumil")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub peserta_id: i64,
    pub nama_suami: Option<String>,
    pub hamil_anak_ke: Option<i32>,
    pub jarak_anak: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub bb_sebelum_hamil: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub tinggi_badan: Option<f64>,
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

impl From<Model> for BumilProfile {
    fn from(model: Model) -> Self {
        BumilProfile {
            nama_suami: model.nama_suami,
            hamil_anak_ke: model.hamil_anak_ke,
            jarak_anak: model.jarak_anak,
            bb_sebelum_hamil: model.bb_sebelum_hamil,
            tinggi_badan: model.tinggi_badan,
        }
    }
}

impl ActiveModel {
    pub fn from_profile(peserta_id: i64, profile: &BumilProfile) -> Self {
        Self {
            peserta_id: Set(peserta_id),
            nama_suami: Set(profile.nama_suami.clone()),
            hamil_anak_ke: Set(profile.hamil_anak_ke),
            jarak_anak: Set(profile.jarak_anak.clone()),
            bb_sebelum_hamil: Set(profile.bb_sebelum_hamil),
            tinggi_badan: Set(profile.tinggi_badan),
        }
    }
}
