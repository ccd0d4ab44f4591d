//! Enrollment service - enrollment lifecycle and progress tracking.
//!
//! Progress events upsert the learner's lesson row and recompute course
//! progress from counts inside one transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::{CourseProgress, LessonResponse, UpdateProgress, UserProgressResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Enrollment service trait for dependency injection.
#[async_trait]
pub trait EnrollmentService: Send + Sync {
    /// Enroll in a published course. Enrolling twice returns the existing
    /// enrollment unchanged.
    async fn enroll(&self, course_id: i32, user_id: i32) -> AppResult<UserProgressResponse>;

    /// Drop the enrollment and the learner's lesson progress in the course.
    async fn unenroll(&self, course_id: i32, user_id: i32) -> AppResult<()>;

    async fn course_progress(&self, course_id: i32, user_id: i32) -> AppResult<UserProgressResponse>;

    /// Published lessons of the course with the learner's completion flags
    async fn lesson_progress(&self, course_id: i32, user_id: i32) -> AppResult<Vec<LessonResponse>>;

    async fn update_progress(
        &self,
        user_id: i32,
        input: UpdateProgress,
    ) -> AppResult<UserProgressResponse>;

    async fn mark_completed(
        &self,
        user_id: i32,
        lesson_id: i32,
        watch_time: i32,
    ) -> AppResult<UserProgressResponse>;
}

/// Concrete implementation of EnrollmentService using Unit of Work.
pub struct EnrollmentManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> EnrollmentManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn record_progress(
        &self,
        user_id: i32,
        lesson_id: i32,
        watch_time: i32,
        completed: bool,
    ) -> AppResult<UserProgressResponse> {
        if watch_time < 0 {
            return Err(AppError::validation("Watch time must not be negative"));
        }

        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .filter(|lesson| lesson.is_published)
            .ok_or_not_found("Lesson")?;
        let course_id = lesson.course_id;

        if !self.uow.enrollments().is_enrolled(user_id, course_id).await? {
            return Err(AppError::NotEnrolled);
        }

        let enrollment = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let enrollments = ctx.enrollments();
                    let enrollment = enrollments
                        .find(user_id, course_id)
                        .await?
                        .ok_or(AppError::NotEnrolled)?;

                    enrollments
                        .record_lesson_progress(user_id, &lesson, watch_time, completed)
                        .await?;

                    let done = enrollments.count_completed_lessons(user_id, course_id).await?;
                    let total = ctx.lessons().count_by_course(course_id).await?;
                    let progress =
                        CourseProgress::compute(done, total, enrollment.completed_at, Utc::now());

                    tracing::debug!(
                        user_id,
                        course_id,
                        completed = done,
                        total,
                        progress = progress.progress,
                        "Course progress recomputed"
                    );

                    let saved = enrollments
                        .save_progress(&enrollment, progress, lesson.id)
                        .await?;
                    Ok::<_, AppError>(saved)
                })
            })
            .await?;

        Ok(UserProgressResponse::from(enrollment))
    }
}

#[async_trait]
impl<U: UnitOfWork> EnrollmentService for EnrollmentManager<U> {
    async fn enroll(&self, course_id: i32, user_id: i32) -> AppResult<UserProgressResponse> {
        let course = self
            .uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found("Course")?;

        if !course.is_published {
            return Err(AppError::bad_request("Course is not published"));
        }

        let enrollment = self.uow.enrollments().enroll(user_id, course_id).await?;
        tracing::info!(user_id, course_id, "User enrolled");
        Ok(UserProgressResponse::from(enrollment))
    }

    async fn unenroll(&self, course_id: i32, user_id: i32) -> AppResult<()> {
        let removed = crate::with_transaction!(self.uow, |ctx| {
            let removed = ctx.enrollments().remove(user_id, course_id).await?;
            Ok::<_, AppError>(removed)
        })?;

        if removed {
            tracing::info!(user_id, course_id, "User unenrolled");
        }
        Ok(())
    }

    async fn course_progress(&self, course_id: i32, user_id: i32) -> AppResult<UserProgressResponse> {
        self.uow
            .enrollments()
            .find(user_id, course_id)
            .await?
            .map(UserProgressResponse::from)
            .ok_or(AppError::NotEnrolled)
    }

    async fn lesson_progress(&self, course_id: i32, user_id: i32) -> AppResult<Vec<LessonResponse>> {
        if !self.uow.enrollments().is_enrolled(user_id, course_id).await? {
            return Err(AppError::NotEnrolled);
        }

        let lessons = self.uow.lessons().list_published(course_id).await?;
        let completed: HashSet<i32> = self
            .uow
            .enrollments()
            .completed_lesson_ids(user_id, course_id)
            .await?
            .into_iter()
            .collect();

        Ok(lessons
            .into_iter()
            .map(|lesson| {
                let done = completed.contains(&lesson.id);
                LessonResponse::for_reader(lesson, true, Some(done))
            })
            .collect())
    }

    async fn update_progress(
        &self,
        user_id: i32,
        input: UpdateProgress,
    ) -> AppResult<UserProgressResponse> {
        self.record_progress(user_id, input.lesson_id, input.watch_time, input.is_completed)
            .await
    }

    async fn mark_completed(
        &self,
        user_id: i32,
        lesson_id: i32,
        watch_time: i32,
    ) -> AppResult<UserProgressResponse> {
        self.record_progress(user_id, lesson_id, watch_time, true).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Course, CourseLevel, Enrollment, Lesson};
    use crate::infra::{MockCourseRepository, MockEnrollmentRepository, MockLessonRepository};
    use crate::services::test_support::TestUnitOfWork;
    use mockall::predicate::eq;

    fn course(is_published: bool) -> Course {
        let now = Utc::now();
        Course {
            id: 10,
            title: "Go Basics".to_string(),
            description: String::new(),
            short_description: String::new(),
            thumbnail: String::new(),
            level: CourseLevel::Beginner,
            category: "programming".to_string(),
            tags: String::new(),
            price: 0.0,
            is_published,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    fn enrollment() -> Enrollment {
        let now = Utc::now();
        Enrollment {
            id: 5,
            user_id: 2,
            course_id: 10,
            progress: 0.0,
            last_lesson_id: None,
            is_completed: false,
            enrolled_at: now,
            completed_at: None,
            updated_at: now,
        }
    }

    fn lesson() -> Lesson {
        let now = Utc::now();
        Lesson {
            id: 3,
            course_id: 10,
            title: "Intro".to_string(),
            description: String::new(),
            video_url: String::new(),
            video_id: String::new(),
            script: String::new(),
            duration: 60,
            sequence: 1,
            is_published: true,
            is_free: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_enroll_unknown_course() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_by_id().returning(|_| Ok(None));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_enroll().never();

        let uow = TestUnitOfWork::builder()
            .courses(courses)
            .enrollments(enrollments)
            .build();
        let result = EnrollmentManager::new(Arc::new(uow)).enroll(10, 2).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_enroll_unpublished_course() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_by_id().returning(|_| Ok(Some(course(false))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_enroll().never();

        let uow = TestUnitOfWork::builder()
            .courses(courses)
            .enrollments(enrollments)
            .build();
        let result = EnrollmentManager::new(Arc::new(uow)).enroll(10, 2).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_enroll_returns_starting_progress() {
        let mut courses = MockCourseRepository::new();
        courses.expect_find_by_id().returning(|_| Ok(Some(course(true))));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_enroll()
            .with(eq(2), eq(10))
            .times(1)
            .returning(|_, _| Ok(enrollment()));

        let uow = TestUnitOfWork::builder()
            .courses(courses)
            .enrollments(enrollments)
            .build();
        let progress = EnrollmentManager::new(Arc::new(uow)).enroll(10, 2).await.unwrap();

        assert_eq!(progress.course_id, 10);
        assert_eq!(progress.progress, 0.0);
        assert!(!progress.is_completed);
    }

    #[tokio::test]
    async fn test_progress_requires_enrollment() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| Ok(Some(lesson())));

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments
            .expect_is_enrolled()
            .with(eq(2), eq(10))
            .returning(|_, _| Ok(false));

        let uow = TestUnitOfWork::builder()
            .lessons(lessons)
            .enrollments(enrollments)
            .build();
        let result = EnrollmentManager::new(Arc::new(uow))
            .mark_completed(2, 3, 60)
            .await;

        assert!(matches!(result, Err(AppError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_progress_for_unknown_lesson() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| Ok(None));

        let uow = TestUnitOfWork::builder().lessons(lessons).build();
        let result = EnrollmentManager::new(Arc::new(uow))
            .update_progress(
                2,
                UpdateProgress {
                    lesson_id: 99,
                    watch_time: 10,
                    is_completed: false,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_progress_rejected_for_unpublished_lesson() {
        let mut lessons = MockLessonRepository::new();
        lessons.expect_find_by_id().returning(|_| {
            let mut draft = lesson();
            draft.is_published = false;
            Ok(Some(draft))
        });

        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_is_enrolled().never();

        let uow = TestUnitOfWork::builder()
            .lessons(lessons)
            .enrollments(enrollments)
            .build();
        let result = EnrollmentManager::new(Arc::new(uow))
            .mark_completed(2, 3, 60)
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_course_progress_not_enrolled() {
        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_find().returning(|_, _| Ok(None));

        let uow = TestUnitOfWork::builder().enrollments(enrollments).build();
        let result = EnrollmentManager::new(Arc::new(uow)).course_progress(10, 2).await;

        assert!(matches!(result, Err(AppError::NotEnrolled)));
    }

    #[tokio::test]
    async fn test_lesson_progress_flags() {
        let mut enrollments = MockEnrollmentRepository::new();
        enrollments.expect_is_enrolled().returning(|_, _| Ok(true));
        enrollments
            .expect_completed_lesson_ids()
            .returning(|_, _| Ok(vec![3]));

        let mut lessons = MockLessonRepository::new();
        lessons.expect_list_published().returning(|_| {
            let mut second = lesson();
            second.id = 4;
            Ok(vec![lesson(), second])
        });

        let uow = TestUnitOfWork::builder()
            .lessons(lessons)
            .enrollments(enrollments)
            .build();
        let flags = EnrollmentManager::new(Arc::new(uow))
            .lesson_progress(10, 2)
            .await
            .unwrap();

        assert_eq!(flags[0].is_completed, Some(true));
        assert_eq!(flags[1].is_completed, Some(false));
    }
}
