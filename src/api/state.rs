//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database};
use crate::services::{
    AuthService, CourseService, EnrollmentService, LessonService, ServiceContainer, Services,
    UserService,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub user_service: Arc<dyn UserService>,
    pub course_service: Arc<dyn CourseService>,
    pub lesson_service: Arc<dyn LessonService>,
    pub enrollment_service: Arc<dyn EnrollmentService>,
    /// Redis cache, absent when `REDIS_URL` is not configured
    pub cache: Option<Arc<Cache>>,
    pub database: Arc<Database>,
    pub app_name: String,
    /// Origins allowed by CORS; empty allows any origin
    pub cors_allowed_origins: Vec<String>,
}

impl AppState {
    /// Build the full service graph over `database`.
    pub fn from_config(database: Arc<Database>, cache: Option<Arc<Cache>>, config: Config) -> Self {
        let app_name = config.app_name.clone();
        let origins = config.cors_allowed_origins.clone();
        let services = Services::from_connection(database.get_connection(), cache.clone(), config);
        Self::new(&services, cache, database, app_name).with_cors_origins(origins)
    }

    /// Assemble state from an existing container.
    pub fn new(
        services: &dyn ServiceContainer,
        cache: Option<Arc<Cache>>,
        database: Arc<Database>,
        app_name: String,
    ) -> Self {
        Self {
            auth_service: services.auth(),
            user_service: services.users(),
            course_service: services.courses(),
            lesson_service: services.lessons(),
            enrollment_service: services.enrollments(),
            cache,
            database,
            app_name,
            cors_allowed_origins: Vec::new(),
        }
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_allowed_origins = origins;
        self
    }
}
