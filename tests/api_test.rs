//! HTTP-level tests driving the full router with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use lms_api::services::{AuthService, CourseService, LessonService, ServiceContainer};

use common::setup;

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_ping_and_root() {
    let app = setup().await;

    let response = app.router.clone().oneshot(get("/ping", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pong");

    let response = app.router.clone().oneshot(get("/", None)).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(String::from_utf8_lossy(&bytes), "Welcome to lms-api");
}

#[tokio::test]
async fn test_health_reports_disabled_cache() {
    let app = setup().await;

    let (status, body) = send(&app.router, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "healthy");
    assert_eq!(body["services"]["cache"]["status"], "disabled");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({"name": "Jane", "email": "Jane@Example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], "jane@example.com");
    assert_eq!(body["data"]["token_type"], "Bearer");

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({"email": "jane@example.com", "password": "secret123"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let (status, body) = send(&app.router, get("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Jane");
}

#[tokio::test]
async fn test_duplicate_register_is_conflict() {
    let app = setup().await;
    app.register("Jane", "jane@example.com").await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({"name": "Jane", "email": "jane@example.com", "password": "secret123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = setup().await;
    app.register("Jane", "jane@example.com").await;

    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            json!({"email": "jane@example.com", "password": "not-the-password"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_validation_errors() {
    let app = setup().await;

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/auth/register",
            None,
            json!({"name": "Jane", "email": "not-an-email", "password": "123"}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let app = setup().await;

    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/courses",
            None,
            json!({"title": "Rust", "category": "programming"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app.router, get("/api/v1/my/courses", Some("garbage"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_course_lifecycle_over_http() {
    let app = setup().await;
    let creator = app.register("Creator", "creator@example.com").await;
    let learner = app.register("Learner", "learner@example.com").await;
    let creator_token = creator.access_token.as_str();
    let learner_token = learner.access_token.as_str();

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            "/api/v1/courses",
            Some(creator_token),
            json!({
                "title": "Rust",
                "category": "programming",
                "tags": ["systems"],
                "is_published": true
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/lessons", course_id),
            Some(creator_token),
            json!({"title": "Ownership", "script": "move semantics", "is_published": true}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let lesson_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app.router, get(&format!("/api/v1/courses/{}", course_id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lessons"][0]["script"], "");
    assert!(body["data"].get("is_enrolled").is_none());

    let (status, _) = send(
        &app.router,
        json_request(
            Method::POST,
            &format!("/api/v1/courses/{}/enroll", course_id),
            Some(learner_token),
            json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::POST,
            &format!("/api/v1/lessons/{}/complete", lesson_id),
            Some(learner_token),
            json!({"watch_time": 42}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["progress"], 100.0);
    assert_eq!(body["data"]["is_completed"], true);

    let (status, body) = send(
        &app.router,
        get(&format!("/api/v1/courses/{}", course_id), Some(learner_token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_enrolled"], true);
    assert_eq!(body["data"]["lessons"][0]["script"], "move semantics");
    assert_eq!(body["data"]["lessons"][0]["is_completed"], true);

    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &format!("/api/v1/courses/{}", course_id),
            Some(learner_token),
            json!({"title": "Mine now"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_progress_without_enrollment_is_forbidden() {
    let app = setup().await;
    let creator = app.register("Creator", "creator@example.com").await;
    let learner = app.register("Learner", "learner@example.com").await;

    let course = app
        .services
        .courses()
        .create_course(creator.user.id, common::course_input("Rust", true))
        .await
        .unwrap();

    let (status, _) = send(
        &app.router,
        get(
            &format!("/api/v1/courses/{}/progress", course.id),
            Some(&learner.access_token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_reorder_accepts_bare_array() {
    let app = setup().await;
    let creator = app.register("Creator", "creator@example.com").await;

    let course = app
        .services
        .courses()
        .create_course(creator.user.id, common::course_input("Rust", true))
        .await
        .unwrap();
    let lessons = app.services.lessons();
    let first = lessons
        .create_lesson(course.id, creator.user.id, common::lesson_input("Ownership", false))
        .await
        .unwrap();
    let second = lessons
        .create_lesson(course.id, creator.user.id, common::lesson_input("Borrowing", false))
        .await
        .unwrap();

    let uri = format!("/api/v1/courses/{}/lessons/reorder", course.id);
    let (status, body) = send(
        &app.router,
        json_request(
            Method::PUT,
            &uri,
            Some(&creator.access_token),
            json!([
                {"lesson_id": first.id, "sequence": 2},
                {"lesson_id": second.id, "sequence": 1}
            ]),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], second.id);
    assert_eq!(body["data"][0]["sequence"], 1);
    assert_eq!(body["data"][1]["id"], first.id);

    let (status, body) = send(
        &app.router,
        json_request(Method::PUT, &uri, Some(&creator.access_token), json!([])),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_anonymous_search_never_lists_drafts() {
    let app = setup().await;
    let creator = app.register("Creator", "creator@example.com").await;

    app.services
        .courses()
        .create_course(creator.user.id, common::course_input("Secret Draft", false))
        .await
        .unwrap();

    let (status, body) = send(
        &app.router,
        get("/api/v1/courses/search?is_published=false", None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["total"], 0);

    let (status, body) = send(
        &app.router,
        get(
            "/api/v1/courses/search?is_published=false",
            Some(&creator.access_token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["data"][0]["title"], "Secret Draft");
}

#[tokio::test]
async fn test_admin_listing_requires_admin_role() {
    let app = setup().await;
    let user = app.register("Plain", "plain@example.com").await;

    let (status, _) = send(&app.router, get("/api/v1/admin/courses", Some(&user.access_token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.make_admin(user.user.id).await;
    let admin = app
        .services
        .auth()
        .login("plain@example.com".to_string(), "secret123".to_string())
        .await
        .unwrap();

    let (status, body) = send(&app.router, get("/api/v1/admin/courses", Some(&admin.access_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_rejects_bad_limit() {
    let app = setup().await;

    let (status, _) = send(&app.router, get("/api/v1/courses/search?limit=0", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app.router, get("/api/v1/courses/search?search=rust", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["total"], 0);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = setup().await;

    let (status, body) = send(&app.router, get("/api/v1/courses/abc", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}
