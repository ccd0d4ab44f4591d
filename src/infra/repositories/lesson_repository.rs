//! Lesson repository implementation.
//!
//! Query helpers generic over `ConnectionTrait` are shared with the
//! transaction-bound repository in the unit of work.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, NotSet, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use super::entities::lesson::{self, ActiveModel, Entity as LessonEntity};
use crate::domain::{CreateLesson, Lesson, UpdateLesson};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Lesson repository trait for dependency injection.
///
/// Listings are ordered by sequence, then id.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Lesson>>;

    async fn create(&self, course_id: i32, input: CreateLesson, sequence: i32) -> AppResult<Lesson>;

    async fn update(&self, id: i32, changes: UpdateLesson) -> AppResult<Lesson>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Every lesson of the course
    async fn list_by_course(&self, course_id: i32) -> AppResult<Vec<Lesson>>;

    /// Published lessons of the course
    async fn list_published(&self, course_id: i32) -> AppResult<Vec<Lesson>>;

    /// Lessons that are both free and published
    async fn list_free(&self, course_id: i32) -> AppResult<Vec<Lesson>>;

    /// One past the highest sequence in the course (1 for an empty course)
    async fn next_sequence(&self, course_id: i32) -> AppResult<i32>;
}

/// Concrete implementation of LessonRepository
pub struct LessonStore {
    db: DatabaseConnection,
}

impl LessonStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn list(&self, condition: sea_orm::Condition) -> AppResult<Vec<Lesson>> {
        let models = LessonEntity::find()
            .filter(condition)
            .order_by_asc(lesson::Column::Sequence)
            .order_by_asc(lesson::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Lesson::from).collect())
    }
}

#[async_trait]
impl LessonRepository for LessonStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Lesson>> {
        find_by_id(&self.db, id).await
    }

    async fn create(&self, course_id: i32, input: CreateLesson, sequence: i32) -> AppResult<Lesson> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            course_id: Set(course_id),
            title: Set(input.title),
            description: Set(input.description),
            video_url: Set(input.video_url.unwrap_or_default()),
            video_id: Set(input.video_id),
            script: Set(input.script),
            duration: Set(input.duration),
            sequence: Set(sequence),
            is_published: Set(input.is_published),
            is_free: Set(input.is_free),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn update(&self, id: i32, changes: UpdateLesson) -> AppResult<Lesson> {
        let lesson = LessonEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Lesson"))?;

        let mut active: ActiveModel = lesson.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(video_url) = changes.video_url {
            active.video_url = Set(video_url);
        }
        if let Some(video_id) = changes.video_id {
            active.video_id = Set(video_id);
        }
        if let Some(script) = changes.script {
            active.script = Set(script);
        }
        if let Some(duration) = changes.duration {
            active.duration = Set(duration);
        }
        if let Some(sequence) = changes.sequence {
            active.sequence = Set(sequence);
        }
        if let Some(is_published) = changes.is_published {
            active.is_published = Set(is_published);
        }
        if let Some(is_free) = changes.is_free {
            active.is_free = Set(is_free);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = LessonEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Lesson"));
        }
        Ok(())
    }

    async fn list_by_course(&self, course_id: i32) -> AppResult<Vec<Lesson>> {
        self.list(sea_orm::Condition::all().add(lesson::Column::CourseId.eq(course_id)))
            .await
    }

    async fn list_published(&self, course_id: i32) -> AppResult<Vec<Lesson>> {
        self.list(
            sea_orm::Condition::all()
                .add(lesson::Column::CourseId.eq(course_id))
                .add(lesson::Column::IsPublished.eq(true)),
        )
        .await
    }

    async fn list_free(&self, course_id: i32) -> AppResult<Vec<Lesson>> {
        self.list(
            sea_orm::Condition::all()
                .add(lesson::Column::CourseId.eq(course_id))
                .add(lesson::Column::IsPublished.eq(true))
                .add(lesson::Column::IsFree.eq(true)),
        )
        .await
    }

    async fn next_sequence(&self, course_id: i32) -> AppResult<i32> {
        let max: Option<i32> = LessonEntity::find()
            .select_only()
            .column(lesson::Column::Sequence)
            .filter(lesson::Column::CourseId.eq(course_id))
            .order_by_desc(lesson::Column::Sequence)
            .into_tuple()
            .one(&self.db)
            .await?;

        Ok(max.unwrap_or(0) + 1)
    }
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<Option<Lesson>> {
    let result = LessonEntity::find_by_id(id).one(conn).await?;
    Ok(result.map(Lesson::from))
}

pub(crate) async fn count_by_course<C: ConnectionTrait>(conn: &C, course_id: i32) -> AppResult<u64> {
    let count = LessonEntity::find()
        .filter(lesson::Column::CourseId.eq(course_id))
        .count(conn)
        .await?;
    Ok(count)
}

/// Move one lesson of `course_id`. Returns the number of rows touched, which
/// is 0 when the lesson does not belong to the course.
pub(crate) async fn update_sequence<C: ConnectionTrait>(
    conn: &C,
    course_id: i32,
    lesson_id: i32,
    sequence: i32,
) -> AppResult<u64> {
    let result = LessonEntity::update_many()
        .col_expr(lesson::Column::Sequence, Expr::value(sequence))
        .col_expr(lesson::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(lesson::Column::Id.eq(lesson_id))
        .filter(lesson::Column::CourseId.eq(course_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
