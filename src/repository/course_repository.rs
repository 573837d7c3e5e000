use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Course, CreateCourseRequest},
    error::{AppError, Result},
    repository::{parse_id, to_utc, CourseRepository},
};

#[derive(FromRow)]
pub(crate) struct CourseRow {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) code: String,
    pub(crate) description: Option<String>,
    pub(crate) is_active: i32,
    pub(crate) created_at: NaiveDateTime,
}

pub struct SqliteCourseRepository {
    pool: SqlitePool,
}

impl SqliteCourseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub(crate) fn row_to_course(row: CourseRow) -> Result<Course> {
        Ok(Course {
            id: parse_id(&row.id)?,
            name: row.name,
            code: row.code,
            description: row.description,
            is_active: row.is_active != 0,
            created_at: to_utc(row.created_at),
        })
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepository {
    async fn create(&self, request: CreateCourseRequest) -> Result<Course> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO courses (id, name, code, description, is_active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            "#
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.code)
        .bind(&request.description)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Course code '{}' already exists", request.code))
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created course".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>> {
        let row = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, code, description, is_active, created_at
            FROM courses
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_course).transpose()
    }

    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, CourseRow>(
            r#"
            SELECT id, name, code, description, is_active, created_at
            FROM courses
            WHERE is_active = 1
            ORDER BY code ASC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_course)
            .collect()
    }
}
