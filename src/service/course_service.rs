use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Course, Enrollment, EnrollmentWithCourse, User},
    error::{AppError, Result},
    repository::{CourseRepository, EnrollmentRepository},
    service::Page,
};

pub struct CourseService {
    courses: Arc<dyn CourseRepository>,
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl CourseService {
    pub fn new(
        courses: Arc<dyn CourseRepository>,
        enrollments: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self { courses, enrollments }
    }

    pub async fn list(&self, page: Page) -> Result<Vec<Course>> {
        self.courses.list_active(page.limit, page.offset).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Course> {
        self.courses
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))
    }

    pub async fn enrollments(&self, user: &User) -> Result<Vec<EnrollmentWithCourse>> {
        self.enrollments.list_for_user(user.id).await
    }

    /// Enroll `user` in an active course.
    ///
    /// Fails with `NotFound` for unknown or inactive courses, and with
    /// `Conflict` when the user is already enrolled or already holds the
    /// maximum number of enrollments, checked in that order.
    pub async fn enroll(&self, user: &User, course_id: Uuid) -> Result<Enrollment> {
        let course = self.courses
            .find_by_id(course_id)
            .await?
            .filter(|c| c.is_active)
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;

        let enrollment = self.enrollments.enroll(user.id, course.id).await?;

        tracing::info!(user_id = %user.id, course = %course.code, "Enrolled in course");
        Ok(enrollment)
    }

    pub async fn unenroll(&self, user: &User, course_id: Uuid) -> Result<()> {
        let course = self.get(course_id).await?;

        if !self.enrollments.unenroll(user.id, course.id).await? {
            return Err(AppError::NotFound("Not enrolled in this course".to_string()));
        }

        tracing::info!(user_id = %user.id, course = %course.code, "Unenrolled from course");
        Ok(())
    }
}
