//! Participant master table.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "peserta")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Ciphertext
    #[sea_orm(column_type = "Text")]
    pub nik: String,
    #[sea_orm(unique)]
    pub nik_hash: String,
    pub nama: String,
    pub kategori: String,
    pub tanggal_lahir: Date,
    pub jenis_kelamin: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub alamat: Option<String>,
    pub rt: Option<String>,
    pub rw: Option<String>,
    /// Ciphertext
    #[sea_orm(column_type = "Text", nullable)]
    pub telepon: Option<String>,
    pub kepesertaan_bpjs: bool,
    pub nomor_bpjs: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::kunjungan::Entity")]
    Kunjungan,
}

impl Related<super::kunjungan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Kunjungan.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
