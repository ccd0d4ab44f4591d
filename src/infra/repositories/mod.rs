//! Repository layer - Data access abstraction
//!
//! Each aggregate gets a trait (mocked in tests) and a SeaORM-backed store.
//! Helpers generic over `ConnectionTrait` are shared with the
//! transaction-bound repositories in the unit of work.

mod course_repository;
pub(crate) mod enrollment_repository;
pub(crate) mod entities;
pub(crate) mod lesson_repository;
mod user_repository;

pub use course_repository::{CourseRepository, CourseStore};
pub use enrollment_repository::{EnrollmentRepository, EnrollmentStore};
pub use lesson_repository::{LessonRepository, LessonStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::MockCourseRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_repository::MockEnrollmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use lesson_repository::MockLessonRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
