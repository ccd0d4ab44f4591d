//! Migration: Create user_courses (enrollment) table.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_table::Users;
use super::m20240101_000002_create_courses_table::Courses;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserCourses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserCourses::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(UserCourses::UserId).integer().not_null())
                    .col(ColumnDef::new(UserCourses::CourseId).integer().not_null())
                    .col(ColumnDef::new(UserCourses::LastLessonId).integer().null())
                    .col(
                        ColumnDef::new(UserCourses::Progress)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(UserCourses::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserCourses::EnrolledAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCourses::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(UserCourses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_courses_user_id")
                            .from(UserCourses::Table, UserCourses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_courses_course_id")
                            .from(UserCourses::Table, UserCourses::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One enrollment per (user, course)
        manager
            .create_index(
                Index::create()
                    .name("idx_user_courses_user_course")
                    .table(UserCourses::Table)
                    .col(UserCourses::UserId)
                    .col(UserCourses::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_courses_course_id")
                    .table(UserCourses::Table)
                    .col(UserCourses::CourseId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserCourses::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum UserCourses {
    Table,
    Id,
    UserId,
    CourseId,
    LastLessonId,
    Progress,
    IsCompleted,
    EnrolledAt,
    CompletedAt,
    UpdatedAt,
}
