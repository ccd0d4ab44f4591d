//! HTTP request handlers.
//!
//! Each module exposes its routes grouped by how much authentication they
//! need; `routes::create_router` applies the matching middleware.

pub mod auth_handler;
pub mod course_handler;
pub mod enrollment_handler;
pub mod lesson_handler;
