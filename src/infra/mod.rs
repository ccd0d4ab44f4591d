//! Infrastructure layer - External systems integration
//!
//! Database connection and migrations, repositories, the Redis cache and
//! the unit of work that scopes transactions.

pub mod cache;
pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    CourseRepository, CourseStore, EnrollmentRepository, EnrollmentStore, LessonRepository,
    LessonStore, UserRepository, UserStore,
};
pub use unit_of_work::{
    Persistence, TransactionContext, TxEnrollmentRepository, TxFuture, TxLessonRepository,
    UnitOfWork,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockCourseRepository, MockEnrollmentRepository, MockLessonRepository, MockUserRepository,
};
