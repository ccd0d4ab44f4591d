//! Course repository: catalogue CRUD, search and aggregated stats.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    JoinType, NotSet, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Set,
};

use super::entities::{
    course::{self, ActiveModel, Entity as CourseEntity},
    lesson, user_course,
};
use crate::domain::{Course, CourseFilter, CourseSort, CourseStats, CreateCourse, SortOrder, UpdateCourse};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Course repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Course>>;

    /// Courses with the given ids, in no particular order
    async fn find_by_ids(&self, ids: Vec<i32>) -> AppResult<Vec<Course>>;

    async fn create(&self, created_by: i32, input: CreateCourse) -> AppResult<Course>;

    /// Apply the present fields of `changes`
    async fn update(&self, id: i32, changes: UpdateCourse) -> AppResult<Course>;

    /// Hard delete; lessons and enrollments cascade
    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Published courses, newest first
    async fn list_published(&self) -> AppResult<Vec<Course>>;

    /// Courses authored by `user_id`, newest first
    async fn list_by_creator(&self, user_id: i32) -> AppResult<Vec<Course>>;

    /// Every course including unpublished ones
    async fn list_all(&self) -> AppResult<Vec<Course>>;

    /// Filtered, sorted page of courses and the total match count.
    ///
    /// `creator` restricts matches to courses authored by that user.
    async fn search(
        &self,
        filter: CourseFilter,
        creator: Option<i32>,
    ) -> AppResult<(Vec<Course>, u64)>;

    /// Lesson and enrollment aggregates for one course
    async fn stats(&self, course_id: i32) -> AppResult<CourseStats>;
}

/// Concrete implementation of CourseRepository
pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn join_tags(tags: &[String]) -> String {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

fn order_of(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: i32) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Course::from))
    }

    async fn find_by_ids(&self, ids: Vec<i32>) -> AppResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = CourseEntity::find()
            .filter(course::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(&self, created_by: i32, input: CreateCourse) -> AppResult<Course> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: NotSet,
            title: Set(input.title),
            description: Set(input.description),
            short_description: Set(input.short_description),
            thumbnail: Set(input.thumbnail.unwrap_or_default()),
            level: Set(input.level.unwrap_or_else(|| "beginner".to_string())),
            category: Set(input.category),
            tags: Set(join_tags(&input.tags)),
            price: Set(input.price),
            is_published: Set(input.is_published),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn update(&self, id: i32, changes: UpdateCourse) -> AppResult<Course> {
        let course = CourseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found("Course"))?;

        let mut active: ActiveModel = course.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(short_description) = changes.short_description {
            active.short_description = Set(short_description);
        }
        if let Some(thumbnail) = changes.thumbnail {
            active.thumbnail = Set(thumbnail);
        }
        if let Some(level) = changes.level {
            active.level = Set(level);
        }
        if let Some(category) = changes.category {
            active.category = Set(category);
        }
        if let Some(tags) = changes.tags {
            active.tags = Set(join_tags(&tags));
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        if let Some(is_published) = changes.is_published {
            active.is_published = Set(is_published);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = CourseEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("Course"));
        }
        Ok(())
    }

    async fn list_published(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .filter(course::Column::IsPublished.eq(true))
            .order_by_desc(course::Column::CreatedAt)
            .order_by_desc(course::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn list_by_creator(&self, user_id: i32) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .filter(course::Column::CreatedBy.eq(user_id))
            .order_by_desc(course::Column::CreatedAt)
            .order_by_desc(course::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn list_all(&self) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .order_by_desc(course::Column::CreatedAt)
            .order_by_desc(course::Column::Id)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn search(
        &self,
        filter: CourseFilter,
        creator: Option<i32>,
    ) -> AppResult<(Vec<Course>, u64)> {
        let mut query = CourseEntity::find()
            .filter(course::Column::IsPublished.eq(filter.is_published.unwrap_or(true)));

        if let Some(creator) = creator {
            query = query.filter(course::Column::CreatedBy.eq(creator));
        }

        if let Some(category) = filter.category.as_deref().filter(|c| !c.is_empty()) {
            query = query.filter(course::Column::Category.contains(category));
        }
        if let Some(level) = filter.level.as_deref() {
            query = query.filter(course::Column::Level.eq(level));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(course::Column::Price.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(course::Column::Price.lte(max_price));
        }
        for tag in filter.tag_list() {
            query = query.filter(course::Column::Tags.contains(tag));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(course::Column::Title.contains(search))
                    .add(course::Column::Description.contains(search)),
            );
        }

        let order = order_of(filter.sort_order);
        query = match filter.sort_by {
            CourseSort::Title => query.order_by(course::Column::Title, order),
            CourseSort::CreatedAt => query.order_by(course::Column::CreatedAt, order),
            CourseSort::Price => query.order_by(course::Column::Price, order),
            CourseSort::EnrolledCount => query
                .join(JoinType::LeftJoin, course::Relation::Enrollments.def())
                .group_by(course::Column::Id)
                .order_by(
                    Expr::col((user_course::Entity, user_course::Column::Id)).count(),
                    order,
                ),
        };
        query = query.order_by_asc(course::Column::Id);

        let paginator = query.paginate(&self.db, filter.per_page());
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(filter.page_index()).await?;

        Ok((models.into_iter().map(Course::from).collect(), total))
    }

    async fn stats(&self, course_id: i32) -> AppResult<CourseStats> {
        let durations: Vec<i32> = lesson::Entity::find()
            .select_only()
            .column(lesson::Column::Duration)
            .filter(lesson::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let enrollments: Vec<(f64, bool)> = user_course::Entity::find()
            .select_only()
            .column(user_course::Column::Progress)
            .column(user_course::Column::IsCompleted)
            .filter(user_course::Column::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await?;

        let enrolled_count = enrollments.len() as u64;
        let average_progress = if enrollments.is_empty() {
            0.0
        } else {
            enrollments.iter().map(|(p, _)| p).sum::<f64>() / enrolled_count as f64
        };

        Ok(CourseStats {
            lesson_count: durations.len() as u64,
            total_duration: durations.iter().map(|d| i64::from(*d)).sum(),
            enrolled_count,
            completed_count: enrollments.iter().filter(|(_, done)| *done).count() as u64,
            average_progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_tags() {
        let tags = vec![" go ".to_string(), String::new(), "backend".to_string()];
        assert_eq!(join_tags(&tags), "go,backend");
        assert_eq!(join_tags(&[]), "");
    }
}
