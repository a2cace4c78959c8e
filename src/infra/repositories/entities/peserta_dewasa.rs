//! Adult extension shared by working-age and elderly participants.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::participant::DewasaProfile;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "peserta_dewasa")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub peserta_id: i64,
    pub pekerjaan: Option<String>,
    pub status_perkawinan: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub riwayat_diri: Option<Json>,
    pub merokok: bool,
    pub konsumsi_gula: bool,
    pub konsumsi_garam: bool,
    pub konsumsi_lemak: bool,
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

impl From<Model> for DewasaProfile {
    fn from(model: Model) -> Self {
        DewasaProfile {
            pekerjaan: model.pekerjaan,
            status_perkawinan: model.status_perkawinan,
            riwayat_diri: model.riwayat_diri,
            merokok: model.merokok,
            konsumsi_gula: model.konsumsi_gula,
            konsumsi_garam: model.konsumsi_garam,
            konsumsi_lemak: model.konsumsi_lemak,
        }
    }
}

impl ActiveModel {
    pub fn from_profile(peserta_id: i64, profile: &DewasaProfile) -> Self {
        Self {
            peserta_id: Set(peserta_id),
            pekerjaan: Set(profile.pekerjaan.clone()),
            status_perkawinan: Set(profile.status_perkawinan.clone()),
            riwayat_diri: Set(profile.riwayat_diri.clone()),
            merokok: Set(profile.merokok),
            konsumsi_gula: Set(profile.konsumsi_gula),
            konsumsi_garam: Set(profile.konsumsi_garam),
            konsumsi_lemak: Set(profile.konsumsi_lemak),
        }
    }
}
