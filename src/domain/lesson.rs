//! Lesson entity, authoring requests and the visibility rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

/// Lesson domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_id: String,
    pub script: String,
    /// Seconds
    pub duration: i32,
    pub sequence: i32,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lesson {
    /// Script is revealed for free lessons and to enrolled callers.
    pub fn script_visible(&self, enrolled: bool) -> bool {
        self.is_free || enrolled
    }
}

/// Lesson creation request
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateLesson {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    #[schema(example = "Variables and types")]
    pub title: String,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(url(message = "Video URL must be a valid URL"))]
    pub video_url: Option<String>,
    #[serde(default)]
    pub video_id: String,
    #[serde(default)]
    pub script: String,
    /// Seconds
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    #[serde(default)]
    pub duration: i32,
    /// Omitted or non-positive appends after the current last lesson
    pub sequence: Option<i32>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_free: bool,
}

/// Partial lesson update
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateLesson {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(url(message = "Video URL must be a valid URL"))]
    pub video_url: Option<String>,
    pub video_id: Option<String>,
    pub script: Option<String>,
    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration: Option<i32>,
    #[validate(range(min = 1, message = "Sequence must be at least 1"))]
    pub sequence: Option<i32>,
    pub is_published: Option<bool>,
    pub is_free: Option<bool>,
}

/// Target position of one lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Validate, ToSchema)]
pub struct LessonOrder {
    pub lesson_id: i32,
    #[validate(range(min = 1, message = "Sequence must be at least 1"))]
    pub sequence: i32,
}

/// Batch reorder request, sent as a bare array of `{lesson_id, sequence}`
#[derive(Debug, Clone, PartialEq, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct ReorderLessons(pub Vec<LessonOrder>);

impl ReorderLessons {
    pub fn into_inner(self) -> Vec<LessonOrder> {
        self.0
    }
}

impl Validate for ReorderLessons {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.0.is_empty() {
            errors.add("lessons", invalid("length", "At least one lesson is required"));
        }
        if self.0.iter().any(|order| order.validate().is_err()) {
            errors.add("sequence", invalid("range", "Sequence must be at least 1"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

/// Lesson representation returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonResponse {
    pub id: i32,
    pub course_id: i32,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub video_id: String,
    /// Empty when the caller may not see the content
    pub script: String,
    pub duration: i32,
    pub sequence: i32,
    pub is_published: bool,
    pub is_free: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Present for enrolled callers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

impl LessonResponse {
    /// Full view, used for the course creator and after writes
    pub fn full(lesson: Lesson) -> Self {
        Self::build(lesson, true, None)
    }

    /// View for a reader: the script is blanked unless the lesson is free or
    /// the reader is enrolled.
    pub fn for_reader(lesson: Lesson, enrolled: bool, is_completed: Option<bool>) -> Self {
        let visible = lesson.script_visible(enrolled);
        Self::build(lesson, visible, is_completed)
    }

    fn build(lesson: Lesson, reveal_script: bool, is_completed: Option<bool>) -> Self {
        Self {
            id: lesson.id,
            course_id: lesson.course_id,
            title: lesson.title,
            description: lesson.description,
            video_url: lesson.video_url,
            video_id: lesson.video_id,
            script: if reveal_script { lesson.script } else { String::new() },
            duration: lesson.duration,
            sequence: lesson.sequence,
            is_published: lesson.is_published,
            is_free: lesson.is_free,
            created_at: lesson.created_at,
            updated_at: lesson.updated_at,
            is_completed,
        }
    }
}
