//! Pregnancy examination of a visit, keyed by the visit id.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use crate::domain::visit::BumilExam;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kunjungan_bumil")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub umur_kehamilan: Option<i32>,
    #[sea_orm(column_type = "Double", nullable)]
    pub lila: Option<f64>,
    pub tekanan_darah: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_tbc: Option<Json>,
    pub tablet_darah: bool,
    pub asi_eksklusif: bool,
    pub mt_bumil_kek: bool,
    pub kelas_bumil: bool,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub penyuluhan: Option<Json>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::kunjungan::Entity",
        from = "Column::Id",
        to = "super::kunjungan::Column::Id",
        on_delete = "Cascade"
    )]
    Kunjungan,
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BumilExam {
    fn from(model: Model) -> Self {
        BumilExam {
            umur_kehamilan: model.umur_kehamilan,
            lila: model.lila,
            tekanan_darah: model.tekanan_darah,
            skrining_tbc: model.skrining_tbc,
            tablet_darah: model.tablet_darah,
            asi_eksklusif: model.asi_eksklusif,
            mt_bumil_kek: model.mt_bumil_kek,
            kelas_bumil: model.kelas_bumil,
            penyuluhan: model.penyuluhan,
        }
    }
}

impl ActiveModel {
    pub fn from_exam(id: i64, exam: &BumilExam) -> Self {
        Self {
            id: Set(id),
            umur_kehamilan: Set(exam.umur_kehamilan),
            lila: Set(exam.lila),
            tekanan_darah: Set(exam.tekanan_darah.clone()),
            skrining_tbc: Set(exam.skrining_tbc.clone()),
            tablet_darah: Set(exam.tablet_darah),
            asi_eksklusif: Set(exam.asi_eksklusif),
            mt_bumil_kek: Set(exam.mt_bumil_kek),
            kelas_bumil: Set(exam.kelas_bumil),
            penyuluhan: Set(exam.penyuluhan.clone()),
        }
    }
}
