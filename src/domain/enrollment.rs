//! Enrollment and per-lesson progress, plus the course progress rule.
//!
//! Course progress is never stored from client input. It is always derived
//! from the number of lessons in the course and the number of lessons the
//! learner has completed, then written back to the enrollment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A user's enrollment in a course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i32,
    pub user_id: i32,
    pub course_id: i32,
    /// 0..=100
    pub progress: f64,
    pub last_lesson_id: Option<i32>,
    pub is_completed: bool,
    pub enrolled_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// A user's progress on one lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub id: i32,
    pub user_id: i32,
    pub lesson_id: i32,
    pub course_id: i32,
    pub is_completed: bool,
    /// Seconds watched
    pub watch_time: i32,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived course progress for one enrollment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CourseProgress {
    pub progress: f64,
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl CourseProgress {
    /// Compute progress from `completed` of `total` lessons.
    ///
    /// A course without lessons has progress 0 and is never complete.
    /// `completed_at` keeps the first completion timestamp while the course
    /// stays complete and is cleared once it drops below 100.
    pub fn compute(
        completed: u64,
        total: u64,
        previous_completed_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let progress = if total == 0 {
            0.0
        } else {
            (completed as f64 * 100.0 / total as f64).clamp(0.0, 100.0)
        };
        let is_completed = total > 0 && completed >= total;

        Self {
            progress,
            is_completed,
            completed_at: if is_completed {
                Some(previous_completed_at.unwrap_or(now))
            } else {
                None
            },
        }
    }
}

/// Explicit progress update for a lesson
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateProgress {
    #[schema(example = 1)]
    pub lesson_id: i32,
    /// Seconds watched
    #[validate(range(min = 0, message = "Watch time must not be negative"))]
    #[serde(default)]
    pub watch_time: i32,
    #[serde(default)]
    pub is_completed: bool,
}

/// Body of the mark-complete endpoint
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CompleteLesson {
    #[validate(range(min = 0, message = "Watch time must not be negative"))]
    #[serde(default)]
    pub watch_time: i32,
}

/// Course progress as returned to the learner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserProgressResponse {
    pub course_id: i32,
    #[schema(example = 50.0)]
    pub progress: f64,
    pub last_lesson_id: Option<i32>,
    pub is_completed: bool,
    pub enrolled_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Enrollment> for UserProgressResponse {
    fn from(enrollment: Enrollment) -> Self {
        Self {
            course_id: enrollment.course_id,
            progress: enrollment.progress,
            last_lesson_id: enrollment.last_lesson_id,
            is_completed: enrollment.is_completed,
            enrolled_at: enrollment.enrolled_at,
            completed_at: enrollment.completed_at,
        }
    }
}
