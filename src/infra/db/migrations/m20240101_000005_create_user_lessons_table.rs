//! Migration: Create user_lessons (per-lesson progress) table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000003_create_lessons_table::Lessons;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserLessons::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserLessons::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserLessons::UserId).integer().not_null())
                    .col(ColumnDef::new(UserLessons::LessonId).integer().not_null())
                    .col(ColumnDef::new(UserLessons::CourseId).integer().not_null())
                    .col(
                        ColumnDef::new(UserLessons::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserLessons::WatchTime)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(UserLessons::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserLessons::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserLessons::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_lessons_user_id")
                            .from(UserLessons::Table, UserLessons::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_lessons_lesson_id")
                            .from(UserLessons::Table, UserLessons::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One progress row per (user, lesson)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_lessons_user_lesson")
                    .table(UserLessons::Table)
                    .col(UserLessons::UserId)
                    .col(UserLessons::LessonId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_lessons_user_course")
                    .table(UserLessons::Table)
                    .col(UserLessons::UserId)
                    .col(UserLessons::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserLessons::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserLessons {
    Table,
    Id,
    UserId,
    LessonId,
    CourseId,
    IsCompleted,
    WatchTime,
    CompletedAt,
    CreatedAt,
    UpdatedAt,
}
