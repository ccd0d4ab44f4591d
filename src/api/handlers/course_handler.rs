//! Course catalogue handlers.

use axum::{
    extract::{Extension, State},
    routing::{get, post, put},
    Router,
};

use crate::api::extractors::{IdPath, ValidatedJson, ValidatedQuery};
use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::{CourseAnalytics, CourseFilter, CourseResponse, CreateCourse, UpdateCourse};
use crate::errors::AppResult;
use crate::types::{ApiResponse, Created, Paginated};

fn caller(user: Option<Extension<CurrentUser>>) -> Option<i32> {
    user.map(|Extension(user)| user.id)
}

/// Routes where a token is optional and only refines the view
pub fn optional_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses/search", get(search_courses))
        .route("/courses/:id", get(get_course))
}

/// Routes that require a valid access token
pub fn protected_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", post(create_course))
        .route("/courses/:id", put(update_course).delete(delete_course))
        .route("/courses/:id/analytics", get(course_analytics))
        .route("/my/courses", get(my_courses))
        .route("/my/enrolled-courses", get(enrolled_courses))
        .route("/admin/courses", get(all_courses))
}

/// List published courses
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    tag = "Courses",
    responses(
        (status = 200, description = "Published courses", body = Vec<CourseResponse>)
    )
)]
pub async fn list_courses(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
) -> AppResult<ApiResponse<Vec<CourseResponse>>> {
    let courses = state.course_service.published_courses(caller(user)).await?;
    Ok(ApiResponse::success(courses))
}

/// Search and filter the catalogue
#[utoipa::path(
    get,
    path = "/api/v1/courses/search",
    tag = "Courses",
    params(CourseFilter),
    responses(
        (status = 200, description = "Matching courses, paginated"),
        (status = 400, description = "Invalid filter")
    )
)]
pub async fn search_courses(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    ValidatedQuery(filter): ValidatedQuery<CourseFilter>,
) -> AppResult<ApiResponse<Paginated<CourseResponse>>> {
    let page = state
        .course_service
        .search_courses(filter, caller(user))
        .await?;
    Ok(ApiResponse::success(page))
}

/// Course detail with lessons
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course found", body = CourseResponse),
        (status = 404, description = "Course not found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    user: Option<Extension<CurrentUser>>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<CourseResponse>> {
    let course = state.course_service.get_course(id, caller(user)).await?;
    Ok(ApiResponse::success(course))
}

/// Create a course owned by the caller
#[utoipa::path(
    post,
    path = "/api/v1/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    request_body = CreateCourse,
    responses(
        (status = 201, description = "Course created", body = CourseResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateCourse>,
) -> AppResult<Created<CourseResponse>> {
    let course = state
        .course_service
        .create_course(current_user.id, payload)
        .await?;
    Ok(Created(ApiResponse::with_message(course, "Course created successfully")))
}

/// Update a course (creator only)
#[utoipa::path(
    put,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    request_body = UpdateCourse,
    responses(
        (status = 200, description = "Course updated", body = CourseResponse),
        (status = 403, description = "Not the course creator"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn update_course(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(id): IdPath,
    ValidatedJson(payload): ValidatedJson<UpdateCourse>,
) -> AppResult<ApiResponse<CourseResponse>> {
    let course = state
        .course_service
        .update_course(id, current_user.id, payload)
        .await?;
    Ok(ApiResponse::with_message(course, "Course updated successfully"))
}

/// Delete a course (creator only)
#[utoipa::path(
    delete,
    path = "/api/v1/courses/{id}",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course deleted"),
        (status = 403, description = "Not the course creator"),
        (status = 404, description = "Course not found")
    )
)]
pub async fn delete_course(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<()>> {
    state.course_service.delete_course(id, current_user.id).await?;
    Ok(ApiResponse::message("Course deleted successfully"))
}

/// Enrollment and completion figures (creator only)
#[utoipa::path(
    get,
    path = "/api/v1/courses/{id}/analytics",
    tag = "Courses",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Course analytics", body = CourseAnalytics),
        (status = 403, description = "Not the course creator")
    )
)]
pub async fn course_analytics(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    IdPath(id): IdPath,
) -> AppResult<ApiResponse<CourseAnalytics>> {
    let analytics = state
        .course_service
        .course_analytics(id, current_user.id)
        .await?;
    Ok(ApiResponse::success(analytics))
}

/// Courses created by the caller
#[utoipa::path(
    get,
    path = "/api/v1/my/courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own courses", body = Vec<CourseResponse>)
    )
)]
pub async fn my_courses(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CourseResponse>>> {
    let courses = state.course_service.creator_courses(current_user.id).await?;
    Ok(ApiResponse::success(courses))
}

/// Courses the caller is enrolled in
#[utoipa::path(
    get,
    path = "/api/v1/my/enrolled-courses",
    tag = "Courses",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Enrolled courses", body = Vec<CourseResponse>)
    )
)]
pub async fn enrolled_courses(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CourseResponse>>> {
    let courses = state
        .course_service
        .enrolled_courses(current_user.id)
        .await?;
    Ok(ApiResponse::success(courses))
}

/// Every course, unpublished included (admin only)
#[utoipa::path(
    get,
    path = "/api/v1/admin/courses",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All courses", body = Vec<CourseResponse>),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn all_courses(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<ApiResponse<Vec<CourseResponse>>> {
    require_admin(&current_user)?;
    let courses = state.course_service.all_courses().await?;
    Ok(ApiResponse::success(courses))
}
