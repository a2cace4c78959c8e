//! Adult examination of a visit, shared by working-age and elderly participants.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::parse_opt;
use crate::domain::visit::DewasaExam;
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kunjungan_dewasa")]
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
    #[sea_orm(column_type = "Double", nullable)]
    pub asam_urat: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub kolesterol: Option<f64>,
    pub tes_mata: Option<String>,
    pub tes_telinga: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_tbc: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_puma: Option<Json>,
    pub jumlah_skor_puma: Option<i32>,
    pub alat_kontrasepsi: Option<String>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub adl: Option<Json>,
    pub jumlah_skor_adl: Option<i32>,
    pub tingkat_kemandirian: Option<String>,
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

impl TryFrom<Model> for DewasaExam {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(DewasaExam {
            tinggi_badan: model.tinggi_badan,
            imt: parse_opt(model.imt.as_deref())?,
            lingkar_perut: model.lingkar_perut,
            tekanan_darah: model.tekanan_darah,
            gula_darah: model.gula_darah,
            asam_urat: model.asam_urat,
            kolesterol: model.kolesterol,
            tes_mata: parse_opt(model.tes_mata.as_deref())?,
            tes_telinga: parse_opt(model.tes_telinga.as_deref())?,
            skrining_tbc: model.skrining_tbc,
            skrining_puma: model.skrining_puma,
            jumlah_skor_puma: model.jumlah_skor_puma,
            alat_kontrasepsi: model.alat_kontrasepsi,
            adl: model.adl,
            jumlah_skor_adl: model.jumlah_skor_adl,
            tingkat_kemandirian: parse_opt(model.tingkat_kemandirian.as_deref())?,
            edukasi: model.edukasi,
        })
    }
}

impl ActiveModel {
    pub fn from_exam(id: i64, exam: &DewasaExam) -> Self {
        let text = |value: Option<&'static str>| value.map(str::to_string);
        Self {
            id: Set(id),
            tinggi_badan: Set(exam.tinggi_badan),
            imt: Set(text(exam.imt.map(|v| v.as_str()))),
            lingkar_perut: Set(exam.lingkar_perut),
            tekanan_darah: Set(exam.tekanan_darah.clone()),
            gula_darah: Set(exam.gula_darah),
            asam_urat: Set(exam.asam_urat),
            kolesterol: Set(exam.kolesterol),
            tes_mata: Set(text(exam.tes_mata.map(|v| v.as_str()))),
            tes_telinga: Set(text(exam.tes_telinga.map(|v| v.as_str()))),
            skrining_tbc: Set(exam.skrining_tbc.clone()),
            skrining_puma: Set(exam.skrining_puma.clone()),
            jumlah_skor_puma: Set(exam.jumlah_skor_puma),
            alat_kontrasepsi: Set(exam.alat_kontrasepsi.clone()),
            adl: Set(exam.adl.clone()),
            jumlah_skor_adl: Set(exam.jumlah_skor_adl),
            tingkat_kemandirian: Set(text(exam.tingkat_kemandirian.map(|v| v.as_str()))),
            edukasi: Set(exam.edukasi.clone()),
        }
    }
}
