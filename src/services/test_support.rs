//! Unit of Work double for service unit tests.
//!
//! Wraps mockall repositories. Transactions are not supported and fail with
//! an internal error, which lets tests assert that a rejected request never
//! reached the write path.

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::{AppError, AppResult};
use crate::infra::{
    CourseRepository, EnrollmentRepository, LessonRepository, MockCourseRepository,
    MockEnrollmentRepository, MockLessonRepository, MockUserRepository, TransactionContext,
    TxFuture, UnitOfWork, UserRepository,
};

pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    courses: Arc<MockCourseRepository>,
    lessons: Arc<MockLessonRepository>,
    enrollments: Arc<MockEnrollmentRepository>,
}

#[derive(Default)]
pub(crate) struct TestUnitOfWorkBuilder {
    users: Option<MockUserRepository>,
    courses: Option<MockCourseRepository>,
    lessons: Option<MockLessonRepository>,
    enrollments: Option<MockEnrollmentRepository>,
}

impl TestUnitOfWork {
    pub(crate) fn builder() -> TestUnitOfWorkBuilder {
        TestUnitOfWorkBuilder::default()
    }
}

impl TestUnitOfWorkBuilder {
    pub(crate) fn users(mut self, repo: MockUserRepository) -> Self {
        self.users = Some(repo);
        self
    }

    pub(crate) fn courses(mut self, repo: MockCourseRepository) -> Self {
        self.courses = Some(repo);
        self
    }

    pub(crate) fn lessons(mut self, repo: MockLessonRepository) -> Self {
        self.lessons = Some(repo);
        self
    }

    pub(crate) fn enrollments(mut self, repo: MockEnrollmentRepository) -> Self {
        self.enrollments = Some(repo);
        self
    }

    pub(crate) fn build(self) -> TestUnitOfWork {
        TestUnitOfWork {
            users: Arc::new(self.users.unwrap_or_default()),
            courses: Arc::new(self.courses.unwrap_or_default()),
            lessons: Arc::new(self.lessons.unwrap_or_default()),
            enrollments: Arc::new(self.enrollments.unwrap_or_default()),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.courses.clone()
    }

    fn lessons(&self) -> Arc<dyn LessonRepository> {
        self.lessons.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.enrollments.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        Err(AppError::internal("Transactions not supported in test mock"))
    }
}
