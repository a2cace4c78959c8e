//! Migration: visits and their four examination tables.
//!
//! An examination row shares the id of its visit and is removed with it.

use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users_table::Users;
use super::m20260101_000002_create_peserta_tables::Peserta;

#[derive(DeriveMigrationName)]
pub struct Migration;

fn detail_key(table: impl Iden + 'static) -> (ColumnDef, ForeignKeyCreateStatement) {
    let mut column = ColumnDef::new(DetailKey::Id);
    column.big_integer().not_null().primary_key();

    let mut foreign_key = ForeignKey::create();
    foreign_key
        .from(table, DetailKey::Id)
        .to(Kunjungan::Table, Kunjungan::Id)
        .on_delete(ForeignKeyAction::Cascade);

    (column, foreign_key)
}

fn flag(column: impl Iden + 'static) -> ColumnDef {
    ColumnDef::new(column)
        .boolean()
        .not_null()
        .default(false)
        .to_owned()
}

fn measure(column: impl Iden + 'static) -> ColumnDef {
    ColumnDef::new(column).double().null().to_owned()
}

fn json(column: impl Iden + 'static) -> ColumnDef {
    ColumnDef::new(column).json_binary().null().to_owned()
}

fn text(column: impl Iden + 'static) -> ColumnDef {
    ColumnDef::new(column).string().null().to_owned()
}

fn number(column: impl Iden + 'static) -> ColumnDef {
    ColumnDef::new(column).integer().null().to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Kunjungan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Kunjungan::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Kunjungan::PesertaId).big_integer().not_null())
                    .col(ColumnDef::new(Kunjungan::TanggalKunjungan).date().not_null())
                    .col(measure(Kunjungan::BeratBadan))
                    .col(flag(Kunjungan::Rujuk))
                    .col(
                        ColumnDef::new(Kunjungan::Lokasi)
                            .string_len(32)
                            .not_null()
                            .default("posyandu"),
                    )
                    .col(ColumnDef::new(Kunjungan::CreatedBy).uuid().null())
                    .col(
                        ColumnDef::new(Kunjungan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Kunjungan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kunjungan_peserta")
                            .from(Kunjungan::Table, Kunjungan::PesertaId)
                            .to(Peserta::Table, Peserta::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_kunjungan_created_by")
                            .from(Kunjungan::Table, Kunjungan::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_kunjungan_peserta_id", Kunjungan::PesertaId),
            ("idx_kunjungan_tanggal", Kunjungan::TanggalKunjungan),
            ("idx_kunjungan_created_at", Kunjungan::CreatedAt),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Kunjungan::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        let (key, mut fk) = detail_key(KunjunganBumil::Table);
        manager
            .create_table(
                Table::create()
                    .table(KunjunganBumil::Table)
                    .if_not_exists()
                    .col(key)
                    .col(number(KunjunganBumil::UmurKehamilan))
                    .col(measure(KunjunganBumil::Lila))
                    .col(text(KunjunganBumil::TekananDarah))
                    .col(json(KunjunganBumil::SkriningTbc))
                    .col(flag(KunjunganBumil::TabletDarah))
                    .col(flag(KunjunganBumil::AsiEksklusif))
                    .col(flag(KunjunganBumil::MtBumilKek))
                    .col(flag(KunjunganBumil::KelasBumil))
                    .col(json(KunjunganBumil::Penyuluhan))
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let (key, mut fk) = detail_key(KunjunganBalita::Table);
        manager
            .create_table(
                Table::create()
                    .table(KunjunganBalita::Table)
                    .if_not_exists()
                    .col(key)
                    .col(number(KunjunganBalita::UmurBulan))
                    .col(text(KunjunganBalita::KesimpulanBb))
                    .col(measure(KunjunganBalita::PanjangBadan))
                    .col(measure(KunjunganBalita::LingkarKepala))
                    .col(measure(KunjunganBalita::LingkarLengan))
                    .col(json(KunjunganBalita::SkriningTbc))
                    .col(json(KunjunganBalita::BalitaMendapatkan))
                    .col(json(KunjunganBalita::EdukasiKonseling))
                    .col(flag(KunjunganBalita::AdaGejalaSakit))
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let (key, mut fk) = detail_key(KunjunganRemaja::Table);
        manager
            .create_table(
                Table::create()
                    .table(KunjunganRemaja::Table)
                    .if_not_exists()
                    .col(key)
                    .col(measure(KunjunganRemaja::TinggiBadan))
                    .col(text(KunjunganRemaja::Imt))
                    .col(measure(KunjunganRemaja::LingkarPerut))
                    .col(text(KunjunganRemaja::TekananDarah))
                    .col(measure(KunjunganRemaja::GulaDarah))
                    .col(text(KunjunganRemaja::KadarHb))
                    .col(json(KunjunganRemaja::SkriningTbc))
                    .col(json(KunjunganRemaja::SkriningMental))
                    .col(json(KunjunganRemaja::Edukasi))
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await?;

        let (key, mut fk) = detail_key(KunjunganDewasa::Table);
        manager
            .create_table(
                Table::create()
                    .table(KunjunganDewasa::Table)
                    .if_not_exists()
                    .col(key)
                    .col(measure(KunjunganDewasa::TinggiBadan))
                    .col(text(KunjunganDewasa::Imt))
                    .col(measure(KunjunganDewasa::LingkarPerut))
                    .col(text(KunjunganDewasa::TekananDarah))
                    .col(measure(KunjunganDewasa::GulaDarah))
                    .col(measure(KunjunganDewasa::AsamUrat))
                    .col(measure(KunjunganDewasa::Kolesterol))
                    .col(text(KunjunganDewasa::TesMata))
                    .col(text(KunjunganDewasa::TesTelinga))
                    .col(json(KunjunganDewasa::SkriningTbc))
                    .col(json(KunjunganDewasa::SkriningPuma))
                    .col(number(KunjunganDewasa::JumlahSkorPuma))
                    .col(text(KunjunganDewasa::AlatKontrasepsi))
                    .col(json(KunjunganDewasa::Adl))
                    .col(number(KunjunganDewasa::JumlahSkorAdl))
                    .col(text(KunjunganDewasa::TingkatKemandirian))
                    .col(json(KunjunganDewasa::Edukasi))
                    .foreign_key(&mut fk)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(KunjunganDewasa::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KunjunganRemaja::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KunjunganBalita::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(KunjunganBumil::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Kunjungan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Kunjungan {
    Table,
    Id,
    PesertaId,
    TanggalKunjungan,
    BeratBadan,
    Rujuk,
    Lokasi,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum DetailKey {
    Id,
}

#[derive(Iden)]
enum KunjunganBumil {
    Table,
    UmurKehamilan,
    Lila,
    TekananDarah,
    SkriningTbc,
    TabletDarah,
    AsiEksklusif,
    MtBumilKek,
    KelasBumil,
    Penyuluhan,
}

#[derive(Iden)]
enum KunjunganBalita {
    Table,
    UmurBulan,
    KesimpulanBb,
    PanjangBadan,
    LingkarKepala,
    LingkarLengan,
    SkriningTbc,
    BalitaMendapatkan,
    EdukasiKonseling,
    AdaGejalaSakit,
}

#[derive(Iden)]
enum KunjunganRemaja {
    Table,
    TinggiBadan,
    Imt,
    LingkarPerut,
    TekananDarah,
    GulaDarah,
    KadarHb,
    SkriningTbc,
    SkriningMental,
    Edukasi,
}

#[derive(Iden)]
enum KunjunganDewasa {
    Table,
    TinggiBadan,
    Imt,
    LingkarPerut,
    TekananDarah,
    GulaDarah,
    AsamUrat,
    Kolesterol,
    TesMata,
    TesTelinga,
    SkriningTbc,
    SkriningPuma,
    JumlahSkorPuma,
    AlatKontrasepsi,
    Adl,
    JumlahSkorAdl,
    TingkatKemandirian,
    Edukasi,
}
