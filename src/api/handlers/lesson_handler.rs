//! Lesson handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post, put},
    Router,
};

use crate::api::extractors::{IdPath, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateLesson, LessonResponse, ReorderLessons, UpdateLesson};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/courses/:id/lessons/free", get(free_lessons))
}

pub fn optional_routes() -> Router<AppState> {
    Router::new()
        .route("/courses/:id/lessons", get(course_lessons))
        .route("/lessons/:id", get(get_lesson))
}

pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/courses/:id/lessons", post(create_lesson))
        .route("/courses/:id/lessons/reorder", put(reorder_lessons))
        .route("/lessons/:id", put(update_lesson).delete(delete_lesson))
}

/// Free preview lessons of a course
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons/free",
    tag = "Lessons",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Free lessons", body = Vec<LessonResponse>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn free_lessons(
    State(state): State<AppState>,
    IdPath(course_id): IdPath,
) -> AppResult<ApiResponse<Vec<LessonResponse>>> {
    let lessons = state.lesson_service.free_lessons(course_id).await?;
    Ok(ApiResponse::success(lessons))
}

/// Lessons of a course as the caller may see them
///
/// Creators see every lesson, enrolled learners see published lessons with
/// completion flags, everyone else sees the free previews.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/lessons",
    tag = "Lessons",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Lessons", body = Vec<LessonResponse>),
        (status = 404, description = "Course not found")
    )
)]
pub async fn course_lessons(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    IdPath(course_id): IdPath,
) -> AppResult<ApiResponse<Vec<LessonResponse>>> {
    let caller_id = user.map(|Extension(user)| user.id);
    let lessons = state
        .lesson_service
        .course_lessons(course_id, caller_id)
        .await?;
    Ok(ApiResponse::success(lessons))
}

#[utoipa::path(
    get,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson found", body = LessonResponse),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn get_lesson(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<LessonResponse>> {
    let caller_id = user.map(|Extension(user)| user.id);
    let lesson = state.lesson_service.get_lesson(id, caller_id).await?;
    Ok(ApiResponse::success(lesson))
}

/// Add a lesson to a course (creator only)
#[utoipa::path(
    post,
    path = "/api/v1/courses/{id}/lessons",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    request_body = CreateLesson,
    responses(
        (status = 201, description = "Lesson created", body = LessonResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not the course creator")
    )
)]
pub async fn create_lesson(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
    ValidatedJson(payload): ValidatedJson<CreateLesson>,
) -> AppResult<Created<LessonResponse>> {
    let lesson = state
        .lesson_service
        .create_lesson(course_id, current_user.id, payload)
        .await?;
    Ok(Created(ApiResponse::with_message(lesson, "Lesson created successfully")))
}

/// Reorder lessons in one atomic batch (creator only)
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}/lessons/reorder",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    request_body = ReorderLessons,
    responses(
        (status = 200, description = "Lessons in their new order", body = Vec<LessonResponse>),
        (status = 400, description = "Lesson does not belong to the course"),
        (status = 403, description = "Not the course creator")
    )
)]
pub async fn reorder_lessons(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(course_id): IdPath,
    ValidatedJson(payload): ValidatedJson<ReorderLessons>,
) -> AppResult<ApiResponse<Vec<LessonResponse>>> {
    let lessons = state
        .lesson_service
        .reorder_lessons(course_id, current_user.id, payload.into_inner())
        .await?;
    Ok(ApiResponse::with_message(lessons, "Lessons reordered successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lesson ID")),
    request_body = UpdateLesson,
    responses(
        (status = 200, description = "Lesson updated", body = LessonResponse),
        (status = 403, description = "Not the course creator"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn update_lesson(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateLesson>,
) -> AppResult<ApiResponse<LessonResponse>> {
    let lesson = state
        .lesson_service
        .update_lesson(id, current_user.id, payload)
        .await?;
    Ok(ApiResponse::with_message(lesson, "Lesson updated successfully"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/lessons/{id}",
    tag = "Lessons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Lesson ID")),
    responses(
        (status = 200, description = "Lesson deleted"),
        (status = 403, description = "Not the course creator"),
        (status = 404, description = "Lesson not found")
    )
)]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    state.lesson_service.delete_lesson(id, current_user.id).await?;
    Ok(ApiResponse::message("Lesson deleted successfully"))
}
