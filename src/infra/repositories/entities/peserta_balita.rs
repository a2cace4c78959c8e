//! Infant extension of a participant.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::participant::BalitaProfile;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "peserta_balita")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub peserta_id: i64,
    pub nama_ortu: Option<String>,
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

impl From<Model> for BalitaProfile {
    fn from(model: Model) -> Self {
        BalitaProfile {
            nama_ortu: model.nama_ortu,
        }
    }
}

impl ActiveModel {
    pub fn from_profile(peserta_id: i64, profile: &BalitaProfile) -> Self {
        Self {
            peserta_id: Set(peserta_id),
            nama_ortu: Set(profile.nama_ortu.clone()),
        }
    }
}
