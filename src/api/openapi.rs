//! OpenAPI documentation configuration.
//!
//! Served through Swagger UI at `/swagger-ui`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, course_handler, enrollment_handler, lesson_handler};
use crate::domain::{
    CompleteLesson, CourseAnalytics, CourseLevel, CourseResponse, CreateCourse, CreateLesson,
    LessonOrder, LessonResponse, ReorderLessons, UpdateCourse, UpdateLesson, UpdateProgress,
    UserProgressResponse, UserResponse, UserRole,
};
use crate::services::AuthResponse;
use crate::types::PaginationMeta;

/// OpenAPI documentation for the LMS API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "LMS API",
        version = "0.1.0",
        description = "Learning management backend: courses, lessons, enrollments and progress"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        auth_handler::refresh,
        auth_handler::logout,
        auth_handler::me,
        course_handler::list_courses,
        course_handler::search_courses,
        course_handler::get_course,
        course_handler::create_course,
        course_handler::update_course,
        course_handler::delete_course,
        course_handler::course_analytics,
        course_handler::my_courses,
        course_handler::enrolled_courses,
        course_handler::all_courses,
        lesson_handler::free_lessons,
        lesson_handler::course_lessons,
        lesson_handler::get_lesson,
        lesson_handler::create_lesson,
        lesson_handler::reorder_lessons,
        lesson_handler::update_lesson,
        lesson_handler::delete_lesson,
        enrollment_handler::enroll,
        enrollment_handler::unenroll,
        enrollment_handler::course_progress,
        enrollment_handler::lesson_progress,
        enrollment_handler::update_progress,
        enrollment_handler::complete_lesson,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RefreshRequest,
            AuthResponse,
            CourseLevel,
            CourseResponse,
            CourseAnalytics,
            CreateCourse,
            UpdateCourse,
            LessonResponse,
            CreateLesson,
            UpdateLesson,
            LessonOrder,
            ReorderLessons,
            UserProgressResponse,
            UpdateProgress,
            CompleteLesson,
            PaginationMeta,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and token lifecycle"),
        (name = "Courses", description = "Course catalogue and authoring"),
        (name = "Lessons", description = "Lesson content and ordering"),
        (name = "Enrollments", description = "Enrollment and learner progress"),
        (name = "Admin", description = "Administrative views")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token obtained from /api/v1/auth/login"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_course_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/courses"));
        assert!(doc.paths.paths.contains_key("/api/v1/courses/{id}/lessons/reorder"));
        assert!(doc.paths.paths.contains_key("/api/v1/lessons/{id}/complete"));
    }
}
