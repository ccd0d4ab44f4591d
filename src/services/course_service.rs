//! Course service - catalogue use cases and the creator gate.
//!
//! Responses carry derived stats (lesson count, duration, enrollment
//! figures). Stats for a list are fetched concurrently.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use super::container::parallel;
use crate::domain::{
    Course, CourseAnalytics, CourseFilter, CourseResponse, CreateCourse, Enrollment,
    LessonResponse, UpdateCourse, UserProgressResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;

/// Load a course and fail with `Forbidden` unless `caller_id` created it.
pub(crate) async fn load_owned_course<U: UnitOfWork>(
    uow: &U,
    course_id: i32,
    caller_id: i32,
) -> AppResult<Course> {
    let course = uow
        .courses()
        .find_by_id(course_id)
        .await?
        .ok_or_not_found("Course")?;

    if !course.is_owned_by(caller_id) {
        return Err(AppError::forbidden("Only the course creator can do this"));
    }
    Ok(course)
}

/// Course service trait for dependency injection.
#[async_trait]
pub trait CourseService: Send + Sync {
    async fn create_course(&self, creator_id: i32, input: CreateCourse) -> AppResult<CourseResponse>;

    async fn update_course(
        &self,
        id: i32,
        caller_id: i32,
        changes: UpdateCourse,
    ) -> AppResult<CourseResponse>;

    async fn delete_course(&self, id: i32, caller_id: i32) -> AppResult<()>;

    /// Course detail with lessons and, for an enrolled caller, progress.
    /// Unpublished courses are only visible to their creator.
    async fn get_course(&self, id: i32, caller_id: Option<i32>) -> AppResult<CourseResponse>;

    async fn published_courses(&self, caller_id: Option<i32>) -> AppResult<Vec<CourseResponse>>;

    /// `is_published=false` matches only the caller's own drafts, and falls
    /// back to published courses for anonymous callers.
    async fn search_courses(
        &self,
        filter: CourseFilter,
        caller_id: Option<i32>,
    ) -> AppResult<Paginated<CourseResponse>>;

    async fn creator_courses(&self, caller_id: i32) -> AppResult<Vec<CourseResponse>>;

    async fn enrolled_courses(&self, caller_id: i32) -> AppResult<Vec<CourseResponse>>;

    /// Every course including unpublished ones
    async fn all_courses(&self) -> AppResult<Vec<CourseResponse>>;

    async fn course_analytics(&self, id: i32, caller_id: i32) -> AppResult<CourseAnalytics>;
}

/// Concrete implementation of CourseService using Unit of Work.
pub struct CourseCatalog<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CourseCatalog<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn respond(&self, course: Course) -> AppResult<CourseResponse> {
        let stats = self.uow.courses().stats(course.id).await?;
        Ok(CourseResponse::new(course, stats))
    }

    async fn respond_all(&self, courses: Vec<Course>) -> AppResult<Vec<CourseResponse>> {
        let futures: Vec<_> = courses.into_iter().map(|c| self.respond(c)).collect();
        parallel::join_all(futures).await
    }

    /// Attach `is_enrolled` when the caller is known.
    async fn mark_enrollment(
        &self,
        responses: Vec<CourseResponse>,
        caller_id: Option<i32>,
    ) -> AppResult<Vec<CourseResponse>> {
        let Some(user_id) = caller_id else {
            return Ok(responses);
        };

        let enrolled: HashSet<i32> = self
            .uow
            .enrollments()
            .list_by_user(user_id)
            .await?
            .into_iter()
            .map(|e| e.course_id)
            .collect();

        Ok(responses
            .into_iter()
            .map(|r| {
                let is_enrolled = enrolled.contains(&r.id);
                r.with_enrollment(is_enrolled)
            })
            .collect())
    }
}

#[async_trait]
impl<U: UnitOfWork> CourseService for CourseCatalog<U> {
    async fn create_course(&self, creator_id: i32, input: CreateCourse) -> AppResult<CourseResponse> {
        let course = self.uow.courses().create(creator_id, input).await?;
        tracing::info!(course_id = course.id, creator_id, "Course created");
        self.respond(course).await
    }

    async fn update_course(
        &self,
        id: i32,
        caller_id: i32,
        changes: UpdateCourse,
    ) -> AppResult<CourseResponse> {
        load_owned_course(self.uow.as_ref(), id, caller_id).await?;
        let course = self.uow.courses().update(id, changes).await?;
        self.respond(course).await
    }

    async fn delete_course(&self, id: i32, caller_id: i32) -> AppResult<()> {
        load_owned_course(self.uow.as_ref(), id, caller_id).await?;
        self.uow.courses().delete(id).await?;
        tracing::info!(course_id = id, "Course deleted");
        Ok(())
    }

    async fn get_course(&self, id: i32, caller_id: Option<i32>) -> AppResult<CourseResponse> {
        let course = self.uow.courses().find_by_id(id).await?.ok_or_not_found("Course")?;

        let is_creator = caller_id.is_some_and(|uid| course.is_owned_by(uid));
        if !course.is_published && !is_creator {
            return Err(AppError::not_found("Course"));
        }

        let enrollment: Option<Enrollment> = match caller_id {
            Some(uid) => self.uow.enrollments().find(uid, id).await?,
            None => None,
        };

        let lessons_repo = self.uow.lessons();
        let lessons_future = async {
            if is_creator {
                lessons_repo.list_by_course(id).await
            } else {
                lessons_repo.list_published(id).await
            }
        };
        let (stats, lessons) =
            parallel::join2(self.uow.courses().stats(id), lessons_future).await?;

        let completed: HashSet<i32> = match &enrollment {
            Some(e) => self
                .uow
                .enrollments()
                .completed_lesson_ids(e.user_id, id)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        let enrolled = enrollment.is_some();
        let lessons = lessons
            .into_iter()
            .map(|lesson| {
                if is_creator {
                    LessonResponse::full(lesson)
                } else {
                    let done = enrolled.then(|| completed.contains(&lesson.id));
                    LessonResponse::for_reader(lesson, enrolled, done)
                }
            })
            .collect();

        let mut response = CourseResponse::new(course, stats);
        response.lessons = Some(lessons);
        if caller_id.is_some() {
            response.is_enrolled = Some(enrolled);
        }
        response.user_progress = enrollment.map(UserProgressResponse::from);
        Ok(response)
    }

    async fn published_courses(&self, caller_id: Option<i32>) -> AppResult<Vec<CourseResponse>> {
        let courses = self.uow.courses().list_published().await?;
        let responses = self.respond_all(courses).await?;
        self.mark_enrollment(responses, caller_id).await
    }

    async fn search_courses(
        &self,
        mut filter: CourseFilter,
        caller_id: Option<i32>,
    ) -> AppResult<Paginated<CourseResponse>> {
        let page = filter.page.max(1);
        let per_page = filter.per_page();

        // Drafts are only searchable by their creator.
        let creator = match (filter.is_published, caller_id) {
            (Some(false), Some(caller_id)) => Some(caller_id),
            (Some(false), None) => {
                filter.is_published = Some(true);
                None
            }
            _ => None,
        };

        let (courses, total) = self.uow.courses().search(filter, creator).await?;
        let responses = self.respond_all(courses).await?;
        let responses = self.mark_enrollment(responses, caller_id).await?;

        Ok(Paginated::new(responses, page, per_page, total))
    }

    async fn creator_courses(&self, caller_id: i32) -> AppResult<Vec<CourseResponse>> {
        let courses = self.uow.courses().list_by_creator(caller_id).await?;
        self.respond_all(courses).await
    }

    async fn enrolled_courses(&self, caller_id: i32) -> AppResult<Vec<CourseResponse>> {
        let enrollments = self.uow.enrollments().list_by_user(caller_id).await?;
        let ids = enrollments.iter().map(|e| e.course_id).collect();

        let mut by_id: HashMap<i32, Course> = self
            .uow
            .courses()
            .find_by_ids(ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        // Keep the most-recent-enrollment-first order of `list_by_user`.
        let mut pairs = Vec::with_capacity(enrollments.len());
        for enrollment in enrollments {
            if let Some(course) = by_id.remove(&enrollment.course_id) {
                pairs.push((course, enrollment));
            }
        }

        let futures: Vec<_> = pairs
            .into_iter()
            .map(|(course, enrollment)| async move {
                let mut response = self.respond(course).await?.with_enrollment(true);
                response.user_progress = Some(UserProgressResponse::from(enrollment));
                Ok::<_, AppError>(response)
            })
            .collect();
        parallel::join_all(futures).await
    }

    async fn all_courses(&self) -> AppResult<Vec<CourseResponse>> {
        let courses = self.uow.courses().list_all().await?;
        self.respond_all(courses).await
    }

    async fn course_analytics(&self, id: i32, caller_id: i32) -> AppResult<CourseAnalytics> {
        load_owned_course(self.uow.as_ref(), id, caller_id).await?;
        let stats = self.uow.courses().stats(id).await?;
        Ok(CourseAnalytics::new(id, stats))
    }
}
