//! Adolescent examination of a visit.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::parse_opt;
use crate::domain::visit::RemajaExam;
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kunjungan_remaja")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    #[sea_orm(column_type = "Double", nullable)]
    pub tinggi_badan: Option<f64>,
    pub imt: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub lingkar_perut: Option<f64>,
    pub tekanan_darah: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub gula_darah: Option<f64>,
    pub kadar_hb: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_tbc: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_mental: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub edukasi: Option<Json>,
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

impl TryFrom<Model> for RemajaExam {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(RemajaExam {
            tinggi_badan: model.tinggi_badan,
            imt: parse_opt(model.imt.as_deref())?,
            lingkar_perut: model.lingkar_perut,
            tekanan_darah: model.tekanan_darah,
            gula_darah: model.gula_darah,
            kadar_hb: model.kadar_hb,
            skrining_tbc: model.skrining_tbc,
            skrining_mental: model.skrining_mental,
            edukasi: model.edukasi,
        })
    }
}

impl ActiveModel {
    pub fn from_exam(id: i64, exam: &RemajaExam) -> Self {
        Self {
            id: Set(id),
            tinggi_badan: Set(exam.tinggi_badan),
            imt: Set(exam.imt.map(|i| i.as_str().to_string())),
            lingkar_perut: Set(exam.lingkar_perut),
            tekanan_darah: Set(exam.tekanan_darah.clone()),
            gula_darah: Set(exam.gula_darah),
            kadar_hb: Set(exam.kadar_hb.clone()),
            skrining_tbc: Set(exam.skrining_tbc.clone()),
            skrining_mental: Set(exam.skrining_mental.clone()),
            edukasi: Set(exam.edukasi.clone()),
        }
    }
}
