//! Migration: complaint tickets, their images and the admin reply thread.

use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Pengaduan::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Pengaduan::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Pengaduan::UserId).uuid().not_null())
                    .col(ColumnDef::new(Pengaduan::Kategori).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Pengaduan::Prioritas)
                            .string_len(16)
                            .not_null()
                            .default("sedang"),
                    )
                    .col(ColumnDef::new(Pengaduan::Judul).string().not_null())
                    .col(ColumnDef::new(Pengaduan::Deskripsi).text().not_null())
                    .col(ColumnDef::new(Pengaduan::LangkahReproduksi).text().null())
                    .col(ColumnDef::new(Pengaduan::BrowserInfo).text().null())
                    .col(
                        ColumnDef::new(Pengaduan::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Pengaduan::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pengaduan::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Pengaduan::DeletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pengaduan_user")
                            .from(Pengaduan::Table, Pengaduan::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_pengaduan_user_id", Pengaduan::UserId),
            ("idx_pengaduan_status", Pengaduan::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Pengaduan::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(PengaduanImages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PengaduanImages::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PengaduanImages::PengaduanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PengaduanImages::Path).string().not_null())
                    .col(
                        ColumnDef::new(PengaduanImages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pengaduan_images_pengaduan")
                            .from(PengaduanImages::Table, PengaduanImages::PengaduanId)
                            .to(Pengaduan::Table, Pengaduan::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PengaduanResponses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PengaduanResponses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PengaduanResponses::PengaduanId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(PengaduanResponses::AdminId).uuid().null())
                    .col(ColumnDef::new(PengaduanResponses::Response).text().not_null())
                    .col(
                        ColumnDef::new(PengaduanResponses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pengaduan_responses_pengaduan")
                            .from(PengaduanResponses::Table, PengaduanResponses::PengaduanId)
                            .to(Pengaduan::Table, Pengaduan::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_pengaduan_responses_admin")
                            .from(PengaduanResponses::Table, PengaduanResponses::AdminId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PengaduanResponses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PengaduanImages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Pengaduan::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Pengaduan {
    Table,
    Id,
    UserId,
    Kategori,
    Prioritas,
    Judul,
    Deskripsi,
    LangkahReproduksi,
    BrowserInfo,
    Status,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(Iden)]
enum PengaduanImages {
    Table,
    Id,
    PengaduanId,
    Path,
    CreatedAt,
}

#[derive(Iden)]
enum PengaduanResponses {
    Table,
    Id,
    PengaduanId,
    AdminId,
    Response,
    CreatedAt,
}
