//! Enrollment repository: user_courses and user_lessons.
//!
//! Inserts use `ON CONFLICT DO NOTHING` against the unique
//! (user, course) and (user, lesson) indexes and then re-read the row, so a
//! concurrent duplicate resolves to the existing record instead of an error.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    sea_query::OnConflict, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::{user_course, user_lesson};
use crate::domain::{CourseProgress, Enrollment, LessonProgress};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Enrollment repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Enrollment of `user_id` in `course_id`
    async fn find(&self, user_id: i32, course_id: i32) -> AppResult<Option<Enrollment>>;

    async fn is_enrolled(&self, user_id: i32, course_id: i32) -> AppResult<bool>;

    /// Create the enrollment unless it exists; the existing row is returned
    /// untouched.
    async fn enroll(&self, user_id: i32, course_id: i32) -> AppResult<Enrollment>;

    /// Enrollments of a user, most recent first
    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Enrollment>>;

    /// Ids of the lessons of `course_id` the user has completed
    async fn completed_lesson_ids(&self, user_id: i32, course_id: i32) -> AppResult<Vec<i32>>;
}

/// Concrete implementation of EnrollmentRepository
pub struct EnrollmentStore {
    db: DatabaseConnection,
}

impl EnrollmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentStore {
    async fn find(&self, user_id: i32, course_id: i32) -> AppResult<Option<Enrollment>> {
        find(&self.db, user_id, course_id).await
    }

    async fn is_enrolled(&self, user_id: i32, course_id: i32) -> AppResult<bool> {
        let count = user_course::Entity::find()
            .filter(user_course::Column::UserId.eq(user_id))
            .filter(user_course::Column::CourseId.eq(course_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn enroll(&self, user_id: i32, course_id: i32) -> AppResult<Enrollment> {
        if let Some(existing) = find(&self.db, user_id, course_id).await? {
            return Ok(existing);
        }

        let now = Utc::now();
        let active_model = user_course::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            course_id: Set(course_id),
            last_lesson_id: Set(None),
            progress: Set(0.0),
            is_completed: Set(false),
            enrolled_at: Set(now),
            completed_at: Set(None),
            updated_at: Set(now),
        };

        user_course::Entity::insert(active_model)
            .on_conflict(
                OnConflict::columns([user_course::Column::UserId, user_course::Column::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        find(&self.db, user_id, course_id)
            .await?
            .ok_or_else(|| AppError::internal("Enrollment missing after insert"))
    }

    async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<Enrollment>> {
        let models = user_course::Entity::find()
            .filter(user_course::Column::UserId.eq(user_id))
            .order_by_desc(user_course::Column::EnrolledAt)
            .order_by_desc(user_course::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Enrollment::from).collect())
    }

    async fn completed_lesson_ids(&self, user_id: i32, course_id: i32) -> AppResult<Vec<i32>> {
        let ids: Vec<i32> = user_lesson::Entity::find()
            .select_only()
            .column(user_lesson::Column::LessonId)
            .filter(user_lesson::Column::UserId.eq(user_id))
            .filter(user_lesson::Column::CourseId.eq(course_id))
            .filter(user_lesson::Column::IsCompleted.eq(true))
            .into_tuple()
            .all(&self.db)
            .await?;
        Ok(ids)
    }
}

pub(crate) async fn find<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    course_id: i32,
) -> AppResult<Option<Enrollment>> {
    let result = user_course::Entity::find()
        .filter(user_course::Column::UserId.eq(user_id))
        .filter(user_course::Column::CourseId.eq(course_id))
        .one(conn)
        .await?;
    Ok(result.map(Enrollment::from))
}

/// Upsert the user's progress row for a lesson.
///
/// Completion is monotone: an update with `completed = false` records the
/// watch time but never clears an earlier completion.
pub(crate) async fn record_lesson_progress<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    lesson_id: i32,
    course_id: i32,
    watch_time: i32,
    completed: bool,
) -> AppResult<LessonProgress> {
    let now = Utc::now();
    let fresh = user_lesson::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        lesson_id: Set(lesson_id),
        course_id: Set(course_id),
        is_completed: Set(false),
        watch_time: Set(0),
        completed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    user_lesson::Entity::insert(fresh)
        .on_conflict(
            OnConflict::columns([user_lesson::Column::UserId, user_lesson::Column::LessonId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    let existing = user_lesson::Entity::find()
        .filter(user_lesson::Column::UserId.eq(user_id))
        .filter(user_lesson::Column::LessonId.eq(lesson_id))
        .one(conn)
        .await?
        .ok_or_else(|| AppError::internal("Lesson progress missing after insert"))?;

    let newly_completed = completed && !existing.is_completed;
    let mut active: user_lesson::ActiveModel = existing.into();
    active.watch_time = Set(watch_time);
    if newly_completed {
        active.is_completed = Set(true);
        active.completed_at = Set(Some(now));
    }
    active.updated_at = Set(now);

    let model = active.update(conn).await?;
    Ok(LessonProgress::from(model))
}

pub(crate) async fn count_completed_lessons<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    course_id: i32,
) -> AppResult<u64> {
    let count = user_lesson::Entity::find()
        .filter(user_lesson::Column::UserId.eq(user_id))
        .filter(user_lesson::Column::CourseId.eq(course_id))
        .filter(user_lesson::Column::IsCompleted.eq(true))
        .count(conn)
        .await?;
    Ok(count)
}

/// Persist recomputed progress on an enrollment.
pub(crate) async fn save_progress<C: ConnectionTrait>(
    conn: &C,
    enrollment: &Enrollment,
    progress: CourseProgress,
    last_lesson_id: i32,
) -> AppResult<Enrollment> {
    let active = user_course::ActiveModel {
        id: Set(enrollment.id),
        last_lesson_id: Set(Some(last_lesson_id)),
        progress: Set(progress.progress),
        is_completed: Set(progress.is_completed),
        completed_at: Set(progress.completed_at),
        updated_at: Set(Utc::now()),
        ..Default::default()
    };

    let model = active.update(conn).await?;
    Ok(Enrollment::from(model))
}

pub(crate) async fn delete_enrollment<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    course_id: i32,
) -> AppResult<u64> {
    let result = user_course::Entity::delete_many()
        .filter(user_course::Column::UserId.eq(user_id))
        .filter(user_course::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

pub(crate) async fn delete_lesson_progress<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    course_id: i32,
) -> AppResult<u64> {
    let result = user_lesson::Entity::delete_many()
        .filter(user_lesson::Column::UserId.eq(user_id))
        .filter(user_lesson::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
