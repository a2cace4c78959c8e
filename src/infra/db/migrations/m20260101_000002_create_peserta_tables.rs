//! Migration: participants and their four category extension tables.
//!
//! Each extension is keyed by the participant id and removed with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Primary key column of an extension table that also references `peserta`.
fn extension_key(table: impl Iden + 'static) -> (ColumnDef, ForeignKeyCreateStatement) {
    let mut column = ColumnDef::new(ExtensionKey::PesertaId);
    column.big_integer().not_null().primary_key();

    let mut foreign_key = ForeignKey::create();
    foreign_key
        .from(table, ExtensionKey::PesertaId)
        .to(Peserta::Table, Peserta::Id)
        .on_delete(ForeignKeyAction::Cascade);

    (column, foreign_key)
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Peserta::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Peserta::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Peserta::Nik).text().not_null())
                    .col(
                        ColumnDef::new(Peserta::NikHash)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Peserta::Nama).string().not_null())
                    .col(ColumnDef::new(Peserta::Kategori).string_len(16).not_null())
                    .col(ColumnDef::new(Peserta::TanggalLahir).date().not_null())
                    .col(ColumnDef::new(Peserta::JenisKelamin).string_len(16).not_null())
                    .col(ColumnDef::new(Peserta::Alamat).text().null())
                    .col(ColumnDef::new(Peserta::Rt).string_len(4).null())
                    .col(ColumnDef::new(Peserta::Rw).string_len(4).null())
                    .col(ColumnDef::new(Peserta::Telepon).text().null())
                    .col(
                        ColumnDef::new(Peserta::KepesertaanBpjs)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Peserta::NomorBpjs).string_len(13).null())
                    .col(
                        ColumnDef::new(Peserta::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Peserta::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_peserta_kategori", Peserta::Kategori),
            ("idx_peserta_nama", Peserta::Nama),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Peserta::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        let (key, mut fk) = extension_key(PesertaBumil::Table);
        manager
            .create_table(
                Table::create()
                    .table(PesertaBumil::Table)
                    .if_not_exists()
                    .col(key)
                    .col(ColumnDef::new(PesertaBumil::NamaSuami).string().null())
                    .col(ColumnDef::new(PesertaBumil::HamilAnakKe).integer().null())
                    .col(ColumnDef::new(PesertaBumil::JarakAnak).string().null())
                    .col(ColumnDef::new(PesertaBumil::BbSebelumHamil).double().null())
                    .col(ColumnDef::new(PesertaBumil::TinggiBadan).double().null())
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let (key, mut fk) = extension_key(PesertaBalita::Table);
        manager
            .create_table(
                Table::create()
                    .table(PesertaBalita::Table)
                    .if_not_exists()
                    .col(key)
                    .col(ColumnDef::new(PesertaBalita::NamaOrtu).string().null())
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let (key, mut fk) = extension_key(PesertaRemaja::Table);
        manager
            .create_table(
                Table::create()
                    .table(PesertaRemaja::Table)
                    .if_not_exists()
                    .col(key)
                    .col(ColumnDef::new(PesertaRemaja::NamaOrtu).string().null())
                    .col(ColumnDef::new(PesertaRemaja::RiwayatKeluarga).json_binary().null())
                    .col(ColumnDef::new(PesertaRemaja::PerilakuBerisiko).json_binary().null())
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let flag = |column: PesertaDewasa| {
            ColumnDef::new(column)
                .boolean()
                .not_null()
                .default(false)
                .to_owned()
        };
        let (key, mut fk) = extension_key(PesertaDewasa::Table);
        manager
            .create_table(
                Table::create()
                    .table(PesertaDewasa::Table)
                    .if_not_exists()
                    .col(key)
                    .col(ColumnDef::new(PesertaDewasa::Pekerjaan).string().null())
                    .col(ColumnDef::new(PesertaDewasa::StatusPerkawinan).string().null())
                    .col(ColumnDef::new(PesertaDewasa::RiwayatDiri).json_binary().null())
                    .col(flag(PesertaDewasa::Merokok))
                    .col(flag(PesertaDewasa::KonsumsiGula))
                    .col(flag(PesertaDewasa::KonsumsiGaram))
                    .col(flag(PesertaDewasa::KonsumsiLemak))
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PesertaDewasa::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PesertaRemaja::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PesertaBalita::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PesertaBumil::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Peserta::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Peserta {
    Table,
    Id,
    Nik,
    NikHash,
    Nama,
    Kategori,
    TanggalLahir,
    JenisKelamin,
    Alamat,
    Rt,
    Rw,
    Telepon,
    KepesertaanBpjs,
    NomorBpjs,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExtensionKey {
    PesertaId,
}

#[derive(Iden)]
enum PesertaBumil {
    Table,
    NamaSuami,
    HamilAnakKe,
    JarakAnak,
    BbSebelumHamil,
    TinggiBadan,
}

#[derive(Iden)]
enum PesertaBalita {
    Table,
    NamaOrtu,
}

#[derive(Iden)]
enum PesertaRemaja {
    Table,
    NamaOrtu,
    RiwayatKeluarga,
    PerilakuBerisiko,
}

#[derive(Iden)]
enum PesertaDewasa {
    Table,
    Pekerjaan,
    StatusPerkawinan,
    RiwayatDiri,
    Merokok,
    KonsumsiGula,
    KonsumsiGaram,
    KonsumsiLemak,
}
