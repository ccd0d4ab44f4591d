//! LMS API - learning management backend
//!
//! Courses with ordered lessons, enrollments and per-learner progress
//! tracking behind a JWT-authenticated REST API.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and rules
//! - **services**: Use cases over the unit of work
//! - **infra**: Database, repositories and the Redis cache
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response envelopes
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve --port 8080
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{Course, Enrollment, Lesson, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
