//! Domain layer - Core business entities and rules
//!
//! Entities, value objects, request types and read models that are
//! independent of persistence and transport.

pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod password;
pub mod user;

pub use course::{
    Course, CourseAnalytics, CourseFilter, CourseLevel, CourseResponse, CourseSort, CourseStats,
    CreateCourse, SortOrder, UpdateCourse,
};
pub use enrollment::{
    CompleteLesson, CourseProgress, Enrollment, LessonProgress, UpdateProgress,
    UserProgressResponse,
};
pub use lesson::{CreateLesson, Lesson, LessonOrder, LessonResponse, ReorderLessons, UpdateLesson};
pub use password::Password;
pub use user::{User, UserResponse, UserRole};
