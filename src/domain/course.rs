//! Course aggregate, catalogue requests and course-level read models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use super::enrollment::UserProgressResponse;
use super::lesson::LessonResponse;
use crate::config::{COURSE_LEVELS, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Difficulty level of a course
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CourseLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "beginner",
            CourseLevel::Intermediate => "intermediate",
            CourseLevel::Advanced => "advanced",
        }
    }
}

impl From<&str> for CourseLevel {
    fn from(s: &str) -> Self {
        match s {
            "intermediate" => CourseLevel::Intermediate,
            "advanced" => CourseLevel::Advanced,
            _ => CourseLevel::Beginner,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course domain entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub thumbnail: String,
    pub level: CourseLevel,
    pub category: String,
    /// Comma-separated tag list as stored
    pub tags: String,
    pub price: f64,
    pub is_published: bool,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Whether `user_id` authored this course
    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.created_by == user_id
    }

    /// Tags split on commas, trimmed, empties dropped
    pub fn tag_list(&self) -> Vec<String> {
        split_tags(&self.tags)
    }
}

pub(crate) fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

fn validate_level(level: &str) -> Result<(), ValidationError> {
    if COURSE_LEVELS.contains(&level) {
        Ok(())
    } else {
        let mut err = ValidationError::new("level");
        err.message = Some("Level must be one of beginner, intermediate, advanced".into());
        Err(err)
    }
}

/// Course creation request
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema)]
pub struct CreateCourse {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    #[schema(example = "Go Basics")]
    pub title: String,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    #[serde(default)]
    pub description: String,
    #[validate(length(max = 500, message = "Short description must be at most 500 characters"))]
    #[serde(default)]
    pub short_description: String,
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail: Option<String>,
    #[validate(custom(function = "validate_level"))]
    #[schema(example = "beginner")]
    pub level: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Category must be between 2 and 100 characters"))]
    #[schema(example = "programming")]
    pub category: String,
    #[serde(default)]
    #[schema(example = json!(["go", "backend"]))]
    pub tags: Vec<String>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub is_published: bool,
}

/// Partial course update; absent fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate, ToSchema)]
pub struct UpdateCourse {
    #[validate(length(min = 3, max = 200, message = "Title must be between 3 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 500, message = "Short description must be at most 500 characters"))]
    pub short_description: Option<String>,
    #[validate(url(message = "Thumbnail must be a valid URL"))]
    pub thumbnail: Option<String>,
    #[validate(custom(function = "validate_level"))]
    pub level: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Category must be between 2 and 100 characters"))]
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(range(min = 0.0, message = "Price must not be negative"))]
    pub price: Option<f64>,
    pub is_published: Option<bool>,
}

/// Sortable course columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CourseSort {
    Title,
    #[default]
    CreatedAt,
    Price,
    EnrolledCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Catalogue search and filter parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseFilter {
    /// Category substring
    pub category: Option<String>,
    #[validate(custom(function = "validate_level"))]
    pub level: Option<String>,
    #[validate(range(min = 0.0, message = "min_price must not be negative"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "max_price must not be negative"))]
    pub max_price: Option<f64>,
    /// Comma-separated tags; every tag must match
    pub tags: Option<String>,
    /// Free text matched against title and description
    pub search: Option<String>,
    /// Defaults to published courses only; `false` lists the caller's own drafts
    pub is_published: Option<bool>,
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u64,
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: u64,
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub sort_by: CourseSort,
    #[serde(default)]
    #[param(value_type = Option<String>)]
    pub sort_order: SortOrder,
}

fn default_page() -> u64 {
    DEFAULT_PAGE_NUMBER
}

fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for CourseFilter {
    fn default() -> Self {
        Self {
            category: None,
            level: None,
            min_price: None,
            max_price: None,
            tags: None,
            search: None,
            is_published: None,
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
            sort_by: CourseSort::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl CourseFilter {
    /// Page size capped at the maximum
    pub fn per_page(&self) -> u64 {
        self.limit.clamp(1, MAX_PAGE_SIZE)
    }

    /// Zero-based page index
    pub fn page_index(&self) -> u64 {
        self.page.max(1) - 1
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags.as_deref().map(split_tags).unwrap_or_default()
    }
}

/// Aggregated numbers for one course
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CourseStats {
    pub lesson_count: u64,
    /// Sum of lesson durations in seconds
    pub total_duration: i64,
    pub enrolled_count: u64,
    pub completed_count: u64,
    pub average_progress: f64,
}

impl CourseStats {
    /// Total duration rounded down to whole minutes
    pub fn duration_minutes(&self) -> i64 {
        self.total_duration / 60
    }

    /// Completed enrollments as a percentage of all enrollments
    pub fn completion_rate(&self) -> f64 {
        if self.enrolled_count == 0 {
            0.0
        } else {
            self.completed_count as f64 / self.enrolled_count as f64 * 100.0
        }
    }
}

/// Course representation returned to clients
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseResponse {
    #[schema(example = 1)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub thumbnail: String,
    pub level: CourseLevel,
    pub category: String,
    pub tags: Vec<String>,
    /// Total lesson duration in minutes
    pub duration: i64,
    pub price: f64,
    pub is_published: bool,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lesson_count: u64,
    pub enrolled_count: u64,
    pub average_progress: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lessons: Option<Vec<LessonResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_enrolled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_progress: Option<UserProgressResponse>,
}

impl CourseResponse {
    pub fn new(course: Course, stats: CourseStats) -> Self {
        let tags = course.tag_list();
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            short_description: course.short_description,
            thumbnail: course.thumbnail,
            level: course.level,
            category: course.category,
            tags,
            duration: stats.duration_minutes(),
            price: course.price,
            is_published: course.is_published,
            created_by: course.created_by,
            created_at: course.created_at,
            updated_at: course.updated_at,
            lesson_count: stats.lesson_count,
            enrolled_count: stats.enrolled_count,
            average_progress: stats.average_progress,
            lessons: None,
            is_enrolled: None,
            user_progress: None,
        }
    }

    pub fn with_enrollment(mut self, is_enrolled: bool) -> Self {
        self.is_enrolled = Some(is_enrolled);
        self
    }
}

/// Creator-facing course analytics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CourseAnalytics {
    pub course_id: i32,
    pub lesson_count: u64,
    pub enrolled_count: u64,
    pub completed_count: u64,
    /// Completed enrollments / enrollments * 100
    pub completion_rate: f64,
    pub average_progress: f64,
}

impl CourseAnalytics {
    pub fn new(course_id: i32, stats: CourseStats) -> Self {
        Self {
            course_id,
            lesson_count: stats.lesson_count,
            enrolled_count: stats.enrolled_count,
            completed_count: stats.completed_count,
            completion_rate: stats.completion_rate(),
            average_progress: stats.average_progress,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request() -> CreateCourse {
        CreateCourse {
            title: "Go Basics".to_string(),
            description: String::new(),
            short_description: String::new(),
            thumbnail: None,
            level: Some("beginner".to_string()),
            category: "programming".to_string(),
            tags: vec![],
            price: 0.0,
            is_published: true,
        }
    }

    #[test]
    fn test_split_tags_trims_and_skips_empty() {
        assert_eq!(split_tags(" go, backend ,,web "), vec!["go", "backend", "web"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn test_create_course_validation() {
        assert!(create_request().validate().is_ok());

        let mut short_title = create_request();
        short_title.title = "Go".to_string();
        assert!(short_title.validate().is_err());

        let mut bad_level = create_request();
        bad_level.level = Some("expert".to_string());
        assert!(bad_level.validate().is_err());

        let mut negative = create_request();
        negative.price = -1.0;
        assert!(negative.validate().is_err());

        let mut bad_thumbnail = create_request();
        bad_thumbnail.thumbnail = Some("not a url".to_string());
        assert!(bad_thumbnail.validate().is_err());
    }

    #[test]
    fn test_filter_limits() {
        let filter = CourseFilter {
            limit: 500,
            ..Default::default()
        };
        assert!(filter.validate().is_err());
        assert_eq!(filter.per_page(), MAX_PAGE_SIZE);

        let first = CourseFilter::default();
        assert_eq!(first.page_index(), 0);
        assert_eq!(first.per_page(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_stats_derivations() {
        let stats = CourseStats {
            lesson_count: 3,
            total_duration: 359,
            enrolled_count: 4,
            completed_count: 1,
            average_progress: 40.0,
        };
        assert_eq!(stats.duration_minutes(), 5);
        assert_eq!(stats.completion_rate(), 25.0);
        assert_eq!(CourseStats::default().completion_rate(), 0.0);
    }
}
