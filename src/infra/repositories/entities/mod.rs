//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod course;
pub mod lesson;
pub mod user;
pub mod user_course;
pub mod user_lesson;
