//! Migration: Create courses table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Courses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Courses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Courses::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Courses::Description).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Courses::ShortDescription)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Courses::Thumbnail).string().not_null().default(""))
                    .col(
                        ColumnDef::new(Courses::Level)
                            .string_len(20)
                            .not_null()
                            .default("beginner"),
                    )
                    .col(ColumnDef::new(Courses::Category).string_len(100).not_null())
                    .col(ColumnDef::new(Courses::Tags).string().not_null().default(""))
                    .col(ColumnDef::new(Courses::Price).double().not_null().default(0.0))
                    .col(
                        ColumnDef::new(Courses::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Courses::CreatedBy).integer().not_null())
                    .col(
                        ColumnDef::new(Courses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Courses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_courses_created_by")
                            .from(Courses::Table, Courses::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_created_by")
                    .table(Courses::Table)
                    .col(Courses::CreatedBy)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_courses_is_published")
                    .table(Courses::Table)
                    .col(Courses::IsPublished)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Courses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Courses {
    Table,
    Id,
    Title,
    Description,
    ShortDescription,
    Thumbnail,
    Level,
    Category,
    Tags,
    Price,
    IsPublished,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
