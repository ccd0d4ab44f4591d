//! Lesson service - authoring, ordering and reader-facing lesson views.
//!
//! Reader views apply the visibility rule: the script is returned for free
//! lessons and for learners enrolled in the course, blanked otherwise.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::course_service::load_owned_course;
use crate::domain::{
    Course, CreateLesson, Lesson, LessonOrder, LessonResponse, UpdateLesson,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Lesson service trait for dependency injection.
#[async_trait]
pub trait LessonService: Send + Sync {
    /// Add a lesson; without a positive `sequence` it goes to the end.
    async fn create_lesson(
        &self,
        course_id: i32,
        caller_id: i32,
        input: CreateLesson,
    ) -> AppResult<LessonResponse>;

    async fn update_lesson(
        &self,
        id: i32,
        caller_id: i32,
        changes: UpdateLesson,
    ) -> AppResult<LessonResponse>;

    async fn delete_lesson(&self, id: i32, caller_id: i32) -> AppResult<()>;

    async fn get_lesson(&self, id: i32, caller_id: Option<i32>) -> AppResult<LessonResponse>;

    /// Lessons of a course as the caller may see them.
    async fn course_lessons(
        &self,
        course_id: i32,
        caller_id: Option<i32>,
    ) -> AppResult<Vec<LessonResponse>>;

    async fn free_lessons(&self, course_id: i32) -> AppResult<Vec<LessonResponse>>;

    /// Apply a batch of sequence changes atomically.
    async fn reorder_lessons(
        &self,
        course_id: i32,
        caller_id: i32,
        order: Vec<LessonOrder>,
    ) -> AppResult<Vec<LessonResponse>>;
}

/// Concrete implementation of LessonService using Unit of Work.
pub struct LessonManager<U: UnitOfWork> {
    uow: Arc<U>,
}

/// How a caller relates to a course
enum Access {
    Creator,
    Enrolled(HashSet<i32>),
    Visitor,
}

impl<U: UnitOfWork> LessonManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find_lesson(&self, id: i32) -> AppResult<Lesson> {
        self.uow.lessons().find_by_id(id).await?.ok_or_not_found("Lesson")
    }

    /// Resolve the caller's access to a course. Unpublished courses only
    /// exist for their creator.
    async fn access(&self, course: &Course, caller_id: Option<i32>) -> AppResult<Access> {
        let Some(user_id) = caller_id else {
            if !course.is_published {
                return Err(AppError::not_found("Course"));
            }
            return Ok(Access::Visitor);
        };

        if course.is_owned_by(user_id) {
            return Ok(Access::Creator);
        }
        if !course.is_published {
            return Err(AppError::not_found("Course"));
        }

        if self.uow.enrollments().is_enrolled(user_id, course.id).await? {
            let completed = self
                .uow
                .enrollments()
                .completed_lesson_ids(user_id, course.id)
                .await?;
            Ok(Access::Enrolled(completed.into_iter().collect()))
        } else {
            Ok(Access::Visitor)
        }
    }

    async fn find_course(&self, course_id: i32) -> AppResult<Course> {
        self.uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found("Course")
    }
}

#[async_trait]
impl<U: UnitOfWork> LessonService for LessonManager<U> {
    async fn create_lesson(
        &self,
        course_id: i32,
        caller_id: i32,
        input: CreateLesson,
    ) -> AppResult<LessonResponse> {
        load_owned_course(self.uow.as_ref(), course_id, caller_id).await?;

        let sequence = match input.sequence {
            Some(sequence) if sequence > 0 => sequence,
            _ => self.uow.lessons().next_sequence(course_id).await?,
        };

        let lesson = self.uow.lessons().create(course_id, input, sequence).await?;
        tracing::info!(lesson_id = lesson.id, course_id, sequence, "Lesson created");
        Ok(LessonResponse::full(lesson))
    }

    async fn update_lesson(
        &self,
        id: i32,
        caller_id: i32,
        changes: UpdateLesson,
    ) -> AppResult<LessonResponse> {
        let lesson = self.find_lesson(id).await?;
        load_owned_course(self.uow.as_ref(), lesson.course_id, caller_id).await?;

        let lesson = self.uow.lessons().update(id, changes).await?;
        Ok(LessonResponse::full(lesson))
    }

    async fn delete_lesson(&self, id: i32, caller_id: i32) -> AppResult<()> {
        let lesson = self.find_lesson(id).await?;
        load_owned_course(self.uow.as_ref(), lesson.course_id, caller_id).await?;

        self.uow.lessons().delete(id).await?;
        tracing::info!(lesson_id = id, course_id = lesson.course_id, "Lesson deleted");
        Ok(())
    }

    async fn get_lesson(&self, id: i32, caller_id: Option<i32>) -> AppResult<LessonResponse> {
        let lesson = self.find_lesson(id).await?;
        let course = self.find_course(lesson.course_id).await?;

        match self.access(&course, caller_id).await? {
            Access::Creator => Ok(LessonResponse::full(lesson)),
            _ if !lesson.is_published => Err(AppError::not_found("Lesson")),
            Access::Enrolled(completed) => {
                let done = completed.contains(&lesson.id);
                Ok(LessonResponse::for_reader(lesson, true, Some(done)))
            }
            Access::Visitor => Ok(LessonResponse::for_reader(lesson, false, None)),
        }
    }

    async fn course_lessons(
        &self,
        course_id: i32,
        caller_id: Option<i32>,
    ) -> AppResult<Vec<LessonResponse>> {
        let course = self.find_course(course_id).await?;

        let responses = match self.access(&course, caller_id).await? {
            Access::Creator => self
                .uow
                .lessons()
                .list_by_course(course_id)
                .await?
                .into_iter()
                .map(LessonResponse::full)
                .collect(),
            Access::Enrolled(completed) => self
                .uow
                .lessons()
                .list_published(course_id)
                .await?
                .into_iter()
                .map(|lesson| {
                    let done = completed.contains(&lesson.id);
                    LessonResponse::for_reader(lesson, true, Some(done))
                })
                .collect(),
            Access::Visitor => self
                .uow
                .lessons()
                .list_free(course_id)
                .await?
                .into_iter()
                .map(|lesson| LessonResponse::for_reader(lesson, false, None))
                .collect(),
        };
        Ok(responses)
    }

    async fn free_lessons(&self, course_id: i32) -> AppResult<Vec<LessonResponse>> {
        let course = self.find_course(course_id).await?;
        if !course.is_published {
            return Err(AppError::not_found("Course"));
        }

        let lessons = self.uow.lessons().list_free(course_id).await?;
        Ok(lessons
            .into_iter()
            .map(|lesson| LessonResponse::for_reader(lesson, false, None))
            .collect())
    }

    async fn reorder_lessons(
        &self,
        course_id: i32,
        caller_id: i32,
        order: Vec<LessonOrder>,
    ) -> AppResult<Vec<LessonResponse>> {
        if order.is_empty() {
            return Err(AppError::validation("At least one lesson is required"));
        }
        if order.iter().any(|item| item.sequence < 1) {
            return Err(AppError::validation("Sequence must be at least 1"));
        }
        load_owned_course(self.uow.as_ref(), course_id, caller_id).await?;

        let count = order.len();
        self.uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let lessons = ctx.lessons();
                    for item in &order {
                        lessons
                            .set_sequence(course_id, item.lesson_id, item.sequence)
                            .await?;
                    }
                    Ok::<_, AppError>(())
                })
            })
            .await?;
        tracing::info!(course_id, count, "Lessons reordered");

        let lessons = self.uow.lessons().list_by_course(course_id).await?;
        Ok(lessons.into_iter().map(LessonResponse::full).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CourseLevel;
    use crate::infra::{MockCourseRepository, MockEnrollmentRepository, MockLessonRepository};
    use crate::services::test_support::TestUnitOfWork;
    use chrono::Utc;
    use mockall::predicate::{always, eq};

    const CREATOR: i32 = 1;
    const LEARNER: i32 = 2;

    fn course(id: i32) -> Course {
        let now = Utc::now();
        Course {
            id,
            title: "Rust".to_string(),
            description: String::new(),
            short_description: String::new(),
            thumbnail: String::new(),
            level: CourseLevel::Beginner,
            category: "programming".to_string(),
            tags: String::new(),
            price: 10.0,
            is_published: true,
            created_by: CREATOR,
            created_at: now,
            updated_at: now,
        }
    }

    fn lesson(id: i32, is_free: bool) -> Lesson {
        let now = Utc::now();
        Lesson {
            id,
            course_id: 10,
            title: "Ownership".to_string(),
            description: String::new(),
            video_url: String::new(),
            video_id: String::new(),
            script: "borrow checker".to_string(),
            duration: 300,
            sequence: 1,
            is_published: true,
            is_free,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_input(sequence: Option<i32>) -> CreateLesson {
        CreateLesson {
            title: "Ownership".to_string(),
            description: String::new(),
            video_url: None,
            video_id: String::new(),
            script: String::new(),
            duration: 300,
            sequence,
            is_published: true,
            is_free: false,
        }
    }

    fn courses_found() -> MockCourseRepository {
        let mut courses = MockCourseRepository::new();
        courses
            .expect_find_by_id()
            .returning(|id| Ok(Some(course(id))));
        courses
    }

    #[tokio::test]
    async fn test_create_lesson_appends_when_sequence_missing() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_next_sequence().with(eq(10)).returning(|_| Ok(4));
        lessons
            .expect_create()
            .with(eq(10), always(), eq(4))
            .returning(|_, _, sequence| {
                let mut created = lesson(5, false);
                created.sequence = sequence;
                Ok(created)
            });

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .build();
        let response = LessonManager::new(Arc::new(uow))
            .create_lesson(10, CREATOR, create_input(Some(0)))
            .await
            .unwrap();

        assert_eq!(response.sequence, 4);
    }

    #[tokio::test]
    async fn test_create_lesson_keeps_explicit_sequence() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_next_sequence().never();
        lessons
            .expect_create()
            .with(eq(10), always(), eq(2))
            .returning(|_, _, _| Ok(lesson(5, false)));

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .build();
        let result = LessonManager::new(Arc::new(uow))
            .create_lesson(10, CREATOR, create_input(Some(2)))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_lesson_by_non_creator_writes_nothing() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_create().never();
        lessons.expect_next_sequence().never();

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .build();
        let result = LessonManager::new(Arc::new(uow))
            .create_lesson(10, LEARNER, create_input(None))
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reorder_by_non_creator_is_forbidden() {
        let uow = TestUnitOfWork::builder().courses(courses_found()).build();
        let result = LessonManager::new(Arc::new(uow))
            .reorder_lessons(10, LEARNER, vec![LessonOrder { lesson_id: 1, sequence: 2 }])
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_reorder_rejects_empty_batch() {
        let uow = TestUnitOfWork::builder().build();
        let result = LessonManager::new(Arc::new(uow))
            .reorder_lessons(10, CREATOR, vec![])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_paid_lesson_without_enrollment_hides_script() {
        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(|id| Ok(Some(lesson(id, false))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_is_enrolled()
            .with(eq(LEARNER), eq(10))
            .returning(|_, _| Ok(false));

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .enrollments(enrollments)
            .build();
        let response = LessonManager::new(Arc::new(uow))
            .get_lesson(3, Some(LEARNER))
            .await
            .unwrap();

        assert_eq!(response.script, "");
        assert_eq!(response.title, "Ownership");
        assert!(response.is_completed.is_none());
    }

    #[tokio::test]
    async fn test_get_lesson_for_enrolled_learner() {
        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_find_by_id()
            .returning(|id| Ok(Some(lesson(id, false))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_is_enrolled().returning(|_, _| Ok(true));
        enrollments
            .expect_completed_lesson_ids()
            .returning(|_, _| Ok(vec![3]));

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .enrollments(enrollments)
            .build();
        let response = LessonManager::new(Arc::new(uow))
            .get_lesson(3, Some(LEARNER))
            .await
            .unwrap();

        assert_eq!(response.script, "borrow checker");
        assert_eq!(response.is_completed, Some(true));
    }

    #[tokio::test]
    async fn test_course_lessons_for_visitor_lists_free_only() {
        let mut lessons = MockLessonRepository::new();
        lessons
            .expect_list_free()
            .with(eq(10))
            .returning(|_| Ok(vec![lesson(1, true)]));
        lessons.expect_list_published().never();

        let uow = TestUnitOfWork::builder()
            .courses(courses_found())
            .lessons(lessons)
            .build();
        let responses = LessonManager::new(Arc::new(uow))
            .course_lessons(10, None)
            .await
            .unwrap();

        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0].script, "borrow checker");
    }
}
