//! Enrollment and progress handlers. Every route requires a token.

use axum::{
    extract::{Extension, State},
    routing::{get, post},
    Router,
};

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CompleteLesson, LessonResponse, UpdateProgress, UserProgressResponse};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/courses/:id/enroll", post(enroll).delete(unenroll))
        .route("/courses/:id/progress", get(course_progress))
        .route("/courses/:id/lessons/progress", get(lesson_progress))
        .route("/lessons/progress", post(update_progress))
        .route("/lessons/:id/complete", post(complete_lesson))
}

/// Enroll in a published course
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/enroll",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 201, description = "Enrolled", body = UserProgressResponse),
        (status = 400, description = "Course is not published"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn enroll(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
) -> AppResult<Created<UserProgressResponse>> {
    let progress = state
        .enrollment_service
        .enroll(course_id, current_user.id)
        .await?;
    Ok(Created(ApiResponse::with_message(progress, "Enrolled successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}/enroll",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Unenrolled")
    )
)]
pub async fn unenroll(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
) -> AppResult<ApiResponse<()>> {
    state
        .enrollment_service
        .unenroll(course_id, current_user.id)
        .await?;
    Ok(ApiResponse::message("Unenrolled successfully"))
}

#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/progress",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course progress", body = UserProgressResponse),
        (status = 403, description = "Not enrolled in this course")
    )
)]
pub async fn course_progress(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
) -> AppResult<ApiResponse<UserProgressResponse>> {
    let progress = state
        .enrollment_service
        .course_progress(course_id, current_user.id)
        .await?;
    Ok(ApiResponse::success(progress))
}

/// Published lessons with the caller's completion flags
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons/progress",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lesson progress", body = Vec<LessonResponse>),
        (status = 403, description = "Not enrolled in this course")
    )
)]
pub async fn lesson_progress(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
) -> AppResult<ApiResponse<Vec<LessonResponse>>> {
    let lessons = state
        .enrollment_service
        .lesson_progress(course_id, current_user.id)
        .await?;
    Ok(ApiResponse::success(lessons))
}

/// Record watch time and completion for a lesson
#[utoipa::path(
    post,
    path = "/api/v1/lessons/progress",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    request_body = UpdateProgress,
    responses(
        (status = 200, description = "Updated course progress", body = UserProgressResponse),
        (status = 403, description = "Not enrolled in this course"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn update_progress(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UpdateProgress>,
) -> AppResult<ApiResponse<UserProgressResponse>> {
    let progress = state
        .enrollment_service
        .update_progress(current_user.id, payload)
        .await?;
    Ok(ApiResponse::success(progress))
}

#[utoipa::path(
    post,
    path = "/api/v1/lessons/{id}/complete",
    tag = "Enrollments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = CompleteLesson,
    responses(
        (status = 200, description = "Updated course progress", body = UserProgressResponse),
        (status = 403, description = "Not enrolled in this course"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(lesson_id): IdPath,
    ValidatedJson(payload): ValidatedJson<CompleteLesson>,
) -> AppResult<ApiResponse<UserProgressResponse>> {
    let progress = state
        .enrollment_service
        .mark_completed(current_user.id, lesson_id, payload.watch_time)
        .await?;
    Ok(ApiResponse::with_message(progress, "Lesson marked as completed"))
}
