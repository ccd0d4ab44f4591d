//! Service Container - Centralized service access with parallel execution support.
//!
//! Handlers reach services through `Arc<dyn Trait>` handles so tests can
//! substitute any of them.

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, Authenticator, CourseCatalog, CourseService, EnrollmentManager,
    EnrollmentService, LessonManager, LessonService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Persistence};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn courses(&self) -> Arc<dyn CourseService>;

    fn lessons(&self) -> Arc<dyn LessonService>;

    fn enrollments(&self) -> Arc<dyn EnrollmentService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    course_service: Arc<dyn CourseService>,
    lesson_service: Arc<dyn LessonService>,
    enrollment_service: Arc<dyn EnrollmentService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        user_service: Arc<dyn UserService>,
        course_service: Arc<dyn CourseService>,
        lesson_service: Arc<dyn LessonService>,
        enrollment_service: Arc<dyn EnrollmentService>,
    ) -> Self {
        Self {
            auth_service,
            user_service,
            course_service,
            lesson_service,
            enrollment_service,
        }
    }

    /// Wire every service over one SeaORM connection.
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        cache: Option<Arc<Cache>>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), cache, config)),
            user_service: Arc::new(UserManager::new(uow.clone())),
            course_service: Arc::new(CourseCatalog::new(uow.clone())),
            lesson_service: Arc::new(LessonManager::new(uow.clone())),
            enrollment_service: Arc::new(EnrollmentManager::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn courses(&self) -> Arc<dyn CourseService> {
        self.course_service.clone()
    }

    fn lessons(&self) -> Arc<dyn LessonService> {
        self.lesson_service.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentService> {
        self.enrollment_service.clone()
    }
}

/// Run independent async operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// Returns the first error as soon as either operation fails.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute homogeneous operations in parallel, keeping input order.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<&'static str> {
            Ok("two")
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, "two");
    }

    #[tokio::test]
    async fn test_parallel_join_all_keeps_order() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_parallel_join_all_propagates_error() {
        let futures: Vec<_> = (0..3)
            .map(|i| async move {
                if i == 1 {
                    Err(AppError::not_found("Course"))
                } else {
                    Ok(i)
                }
            })
            .collect();
        let result = parallel::join_all(futures).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
