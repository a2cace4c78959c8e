//! Infant examination of a visit.

use sea_orm::entity::prelude::*;
use sea_orm::Set;

use super::parse_opt;
use crate::domain::visit::BalitaExam;
use crate::errors::{AppError, AppResult};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "kunjungan_balita")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub umur_bulan: Option<i32>,
    pub kesimpulan_bb: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub panjang_badan: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub lingkar_kepala: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub lingkar_lengan: Option<f64>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub skrining_tbc: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub balita_mendapatkan: Option<Json>,
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub edukasi_konseling: Option<Json>,
    pub ada_gejala_sakit: bool,
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

impl TryFrom<Model> for BalitaExam {
    type Error = AppError;

    fn try_from(model: Model) -> AppResult<Self> {
        Ok(BalitaExam {
            umur_bulan: model.umur_bulan,
            kesimpulan_bb: parse_opt(model.kesimpulan_bb.as_deref())?,
            panjang_badan: model.panjang_badan,
            lingkar_kepala: model.lingkar_kepala,
            lingkar_lengan: model.lingkar_lengan,
            skrining_tbc: model.skrining_tbc,
            balita_mendapatkan: model.balita_mendapatkan,
            edukasi_konseling: model.edukasi_konseling,
            ada_gejala_sakit: model.ada_gejala_sakit,
        })
    }
}

impl ActiveModel {
    pub fn from_exam(id: i64, exam: &BalitaExam) -> Self {
        Self {
            id: Set(id),
            umur_bulan: Set(exam.umur_bulan),
            kesimpulan_bb: Set(exam.kesimpulan_bb.map(|k| k.as_str().to_string())),
            panjang_badan: Set(exam.panjang_badan),
            lingkar_kepala: Set(exam.lingkar_kepala),
            lingkar_lengan: Set(exam.lingkar_lengan),
            skrining_tbc: Set(exam.skrining_tbc.clone()),
            balita_mendapatkan: Set(exam.balita_mendapatkan.clone()),
            edukasi_konseling: Set(exam.edukasi_konseling.clone()),
            ada_gejala_sakit: Set(exam.ada_gejala_sakit),
        }
    }
}
