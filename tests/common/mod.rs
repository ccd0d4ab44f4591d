//! Shared setup for integration tests: an in-memory SQLite database with
//! every migration applied and the real service graph on top.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use sea_orm::{ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use lms_api::api::{create_router, AppState};
use lms_api::config::Config;
use lms_api::domain::{CreateCourse, CreateLesson};
use lms_api::infra::{Database, Migrator};
use lms_api::services::{AuthResponse, AuthService, ServiceContainer, Services};

pub struct TestApp {
    pub db: DatabaseConnection,
    pub services: Services,
    pub router: Router,
}

pub async fn setup() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = SeaDatabase::connect(options)
        .await
        .expect("in-memory sqlite should open");
    Migrator::up(&db, None).await.expect("migrations should apply");

    let config = Config::default();
    let services = Services::from_connection(db.clone(), None, config.clone());
    let state = AppState::new(
        &services,
        None,
        Arc::new(Database::from_connection(db.clone())),
        config.app_name.clone(),
    );

    TestApp {
        db,
        services,
        router: create_router(state),
    }
}

impl TestApp {
    pub async fn register(&self, name: &str, email: &str) -> AuthResponse {
        self.services
            .auth()
            .register(name.to_string(), email.to_string(), "secret123".to_string())
            .await
            .expect("registration should succeed")
    }

    pub async fn make_admin(&self, user_id: i32) {
        self.db
            .execute_unprepared(&format!("UPDATE users SET role = 'admin' WHERE id = {}", user_id))
            .await
            .expect("role update should succeed");
    }
}

pub fn course_input(title: &str, is_published: bool) -> CreateCourse {
    CreateCourse {
        title: title.to_string(),
        description: format!("All about {}", title),
        short_description: String::new(),
        thumbnail: None,
        level: Some("beginner".to_string()),
        category: "programming".to_string(),
        tags: vec!["backend".to_string()],
        price: 19.0,
        is_published,
    }
}

pub fn lesson_input(title: &str, is_free: bool) -> CreateLesson {
    CreateLesson {
        title: title.to_string(),
        description: String::new(),
        video_url: None,
        video_id: String::new(),
        script: format!("{} script", title),
        duration: 120,
        sequence: None,
        is_published: true,
        is_free,
    }
}
