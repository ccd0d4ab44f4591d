//! Migration: Create lessons table.

use sea_orm_migration::prelude::*;

use super::m20240101_000002_create_courses_table::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Lessons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Lessons::CourseId).integer().not_null())
                    .col(ColumnDef::new(Lessons::Title).string_len(200).not_null())
                    .col(ColumnDef::new(Lessons::Description).text().not_null().default(""))
                    .col(ColumnDef::new(Lessons::VideoUrl).string().not_null().default(""))
                    .col(ColumnDef::new(Lessons::VideoId).string().not_null().default(""))
                    .col(ColumnDef::new(Lessons::Script).text().not_null().default(""))
                    .col(ColumnDef::new(Lessons::Duration).integer().not_null().default(0))
                    .col(ColumnDef::new(Lessons::Sequence).integer().not_null())
                    .col(
                        ColumnDef::new(Lessons::IsPublished)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Lessons::IsFree)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Lessons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Lessons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lessons_course_id")
                            .from(Lessons::Table, Lessons::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Sequence orders lessons within a course but is not unique
        manager
            .create_index(
                Index::create()
                    .name("idx_lessons_course_sequence")
                    .table(Lessons::Table)
                    .col(Lessons::CourseId)
                    .col(Lessons::Sequence)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Lessons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub(super) enum Lessons {
    Table,
    Id,
    CourseId,
    Title,
    Description,
    VideoUrl,
    VideoId,
    Script,
    Duration,
    Sequence,
    IsPublished,
    IsFree,
    CreatedAt,
    UpdatedAt,
}
