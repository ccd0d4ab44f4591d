//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the transaction lifecycle for
//! multi-statement writes (progress recording, lesson reordering,
//! unenrollment).

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::repositories::{
    enrollment_repository, lesson_repository, CourseRepository, CourseStore, EnrollmentRepository,
    EnrollmentStore, LessonRepository, LessonStore, UserRepository, UserStore,
};
use crate::domain::{CourseProgress, Enrollment, Lesson, LessonProgress};
use crate::errors::{AppError, AppResult};

/// Boxed future returned by transaction closures.
pub type TxFuture<'a, T> = Pin<Box<dyn Future<Output = AppResult<T>> + Send + 'a>>;

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction methods; tests
/// substitute a hand-written implementation instead.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn courses(&self) -> Arc<dyn CourseRepository>;

    fn lessons(&self) -> Arc<dyn LessonRepository>;

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository>;

    /// Execute a closure within a ReadCommitted transaction.
    ///
    /// Commits when the closure returns `Ok`, rolls back otherwise.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send;
}

/// Repository access bound to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn lessons(&self) -> TxLessonRepository<'_> {
        TxLessonRepository { txn: self.txn }
    }

    pub fn enrollments(&self) -> TxEnrollmentRepository<'_> {
        TxEnrollmentRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    course_repo: Arc<CourseStore>,
    lesson_repo: Arc<LessonStore>,
    enrollment_repo: Arc<EnrollmentStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            course_repo: Arc::new(CourseStore::new(db.clone())),
            lesson_repo: Arc::new(LessonStore::new(db.clone())),
            enrollment_repo: Arc::new(EnrollmentStore::new(db.clone())),
            db,
        }
    }

    async fn execute_transaction<F, T>(&self, isolation: IsolationLevel, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(Some(isolation), Some(AccessMode::ReadWrite))
            .await?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.course_repo.clone()
    }

    fn lessons(&self) -> Arc<dyn LessonRepository> {
        self.lesson_repo.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.enrollment_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> TxFuture<'a, T> + Send,
        T: Send,
    {
        self.execute_transaction(IsolationLevel::ReadCommitted, f).await
    }
}

/// Lesson queries inside a transaction.
pub struct TxLessonRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxLessonRepository<'a> {
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Lesson>> {
        lesson_repository::find_by_id(self.txn, id).await
    }

    pub async fn count_by_course(&self, course_id: i32) -> AppResult<u64> {
        lesson_repository::count_by_course(self.txn, course_id).await
    }

    /// Set the sequence of a lesson; fails with `BadRequest` unless exactly
    /// one lesson of `course_id` was updated.
    pub async fn set_sequence(&self, course_id: i32, lesson_id: i32, sequence: i32) -> AppResult<()> {
        let updated =
            lesson_repository::update_sequence(self.txn, course_id, lesson_id, sequence).await?;
        if updated != 1 {
            return Err(AppError::bad_request(format!(
                "Lesson {} does not belong to course {}",
                lesson_id, course_id
            )));
        }
        Ok(())
    }
}

/// Enrollment and lesson-progress writes inside a transaction.
pub struct TxEnrollmentRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxEnrollmentRepository<'a> {
    pub async fn find(&self, user_id: i32, course_id: i32) -> AppResult<Option<Enrollment>> {
        enrollment_repository::find(self.txn, user_id, course_id).await
    }

    pub async fn record_lesson_progress(
        &self,
        user_id: i32,
        lesson: &Lesson,
        watch_time: i32,
        completed: bool,
    ) -> AppResult<LessonProgress> {
        enrollment_repository::record_lesson_progress(
            self.txn,
            user_id,
            lesson.id,
            lesson.course_id,
            watch_time,
            completed,
        )
        .await
    }

    pub async fn count_completed_lessons(&self, user_id: i32, course_id: i32) -> AppResult<u64> {
        enrollment_repository::count_completed_lessons(self.txn, user_id, course_id).await
    }

    pub async fn save_progress(
        &self,
        enrollment: &Enrollment,
        progress: CourseProgress,
        last_lesson_id: i32,
    ) -> AppResult<Enrollment> {
        enrollment_repository::save_progress(self.txn, enrollment, progress, last_lesson_id).await
    }

    /// Remove the enrollment together with the user's lesson progress in
    /// that course. Returns `false` when there was no enrollment.
    pub async fn remove(&self, user_id: i32, course_id: i32) -> AppResult<bool> {
        enrollment_repository::delete_lesson_progress(self.txn, user_id, course_id).await?;
        let removed = enrollment_repository::delete_enrollment(self.txn, user_id, course_id).await?;
        Ok(removed > 0)
    }
}

/// Run `$body` inside `$uow.transaction`, binding the context to `$ctx`.
#[macro_export]
macro_rules! with_transaction {
    ($uow:expr, |$ctx:ident| $body:expr) => {
        $uow.transaction(move |$ctx| Box::pin(async move { $body })).await
    };
}
