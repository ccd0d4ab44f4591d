//! Application services layer - Use cases and business logic.
//!
//! Services apply business rules over the Unit of Work and shape responses.
//! Each is exposed as a trait so handlers and tests depend on abstractions.

mod auth_service;
pub mod container;
mod course_service;
mod enrollment_service;
mod lesson_service;
mod user_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthResponse, AuthService, Authenticator, Claims};
pub use course_service::{CourseCatalog, CourseService};
pub use enrollment_service::{EnrollmentManager, EnrollmentService};
pub use lesson_service::{LessonManager, LessonService};
pub use user_service::{UserManager, UserService};
