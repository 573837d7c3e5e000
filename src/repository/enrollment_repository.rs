use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Enrollment, EnrollmentWithCourse, MAX_ENROLLMENTS_PER_USER},
    error::{AppError, Result},
    repository::{
        course_repository::{CourseRow, SqliteCourseRepository},
        parse_id, to_utc, EnrollmentRepository,
    },
};

/// Message raised by the `enrollments_capacity` trigger.
const CAPACITY_TRIGGER_MESSAGE: &str = "enrollment limit reached";

#[derive(FromRow)]
struct EnrollmentCourseRow {
    id: String,
    user_id: String,
    course_id: String,
    enrolled_at: NaiveDateTime,
    course_name: String,
    course_code: String,
    course_description: Option<String>,
    course_is_active: i32,
    course_created_at: NaiveDateTime,
}

pub struct SqliteEnrollmentRepository {
    pool: SqlitePool,
}

impl SqliteEnrollmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_enrollment(row: EnrollmentCourseRow) -> Result<EnrollmentWithCourse> {
        let course = SqliteCourseRepository::row_to_course(CourseRow {
            id: row.course_id.clone(),
            name: row.course_name,
            code: row.course_code,
            description: row.course_description,
            is_active: row.course_is_active,
            created_at: row.course_created_at,
        })?;

        Ok(EnrollmentWithCourse {
            id: parse_id(&row.id)?,
            user_id: parse_id(&row.user_id)?,
            course_id: course.id,
            enrolled_at: to_utc(row.enrolled_at),
            course,
        })
    }
}

fn already_enrolled() -> AppError {
    AppError::Conflict("Already enrolled in this course".to_string())
}

fn capacity_reached() -> AppError {
    AppError::Conflict(format!(
        "Cannot enroll in more than {} courses",
        MAX_ENROLLMENTS_PER_USER
    ))
}

fn map_insert_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => already_enrolled(),
        sqlx::Error::Database(ref db) if db.message().contains(CAPACITY_TRIGGER_MESSAGE) => {
            capacity_reached()
        }
        other => AppError::Database(other.to_string()),
    }
}

#[async_trait]
impl EnrollmentRepository for SqliteEnrollmentRepository {
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        // A single autocommit statement holds the write lock before the
        // capacity trigger counts; concurrent enrollers wait on busy_timeout.
        sqlx::query(
            r#"
            INSERT INTO enrollments (id, user_id, course_id, enrolled_at)
            VALUES (?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .bind(now.naive_utc())
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(Enrollment {
            id,
            user_id,
            course_id,
            enrolled_at: now,
        })
    }

    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM enrollments WHERE user_id = ? AND course_id = ?")
            .bind(user_id.to_string())
            .bind(course_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE user_id = ? AND course_id = ?)"
        )
        .bind(user_id.to_string())
        .bind(course_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    async fn count_for_user(&self, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM enrollments WHERE user_id = ?"
        )
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<EnrollmentWithCourse>> {
        let rows = sqlx::query_as::<_, EnrollmentCourseRow>(
            r#"
            SELECT e.id, e.user_id, e.course_id, e.enrolled_at,
                   c.name AS course_name, c.code AS course_code,
                   c.description AS course_description,
                   c.is_active AS course_is_active,
                   c.created_at AS course_created_at
            FROM enrollments e
            JOIN courses c ON c.id = e.course_id
            WHERE e.user_id = ?
            ORDER BY e.enrolled_at ASC
            "#
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_enrollment)
            .collect()
    }
}
