use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateMaterial, Material},
    error::{AppError, Result},
    repository::{parse_id, to_utc, MaterialRepository, StoredFile},
};

#[derive(FromRow)]
struct MaterialRow {
    id: String,
    course_id: String,
    author_id: String,
    title: String,
    description: Option<String>,
    file_path: String,
    file_name: String,
    file_size: i64,
    created_at: NaiveDateTime,
}

pub struct SqliteMaterialRepository {
    pool: SqlitePool,
}

impl SqliteMaterialRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_material(row: MaterialRow) -> Result<Material> {
        Ok(Material {
            id: parse_id(&row.id)?,
            course_id: parse_id(&row.course_id)?,
            author_id: parse_id(&row.author_id)?,
            title: row.title,
            description: row.description,
            file_path: row.file_path,
            file_name: row.file_name,
            file_size: row.file_size,
            created_at: to_utc(row.created_at),
        })
    }
}

#[async_trait]
impl MaterialRepository for SqliteMaterialRepository {
    async fn create(&self, author_id: Uuid, material: CreateMaterial, file: StoredFile) -> Result<Material> {
        let id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO materials (
                id, course_id, author_id, title, description,
                file_path, file_name, file_size, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(material.course_id.to_string())
        .bind(author_id.to_string())
        .bind(&material.title)
        .bind(&material.description)
        .bind(&file.path)
        .bind(&file.file_name)
        .bind(file.size)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created material".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>> {
        let row = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, course_id, author_id, title, description,
                   file_path, file_name, file_size, created_at
            FROM materials
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_material).transpose()
    }

    async fn list_for_course(&self, course_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(
            r#"
            SELECT id, course_id, author_id, title, description,
                   file_path, file_name, file_size, created_at
            FROM materials
            WHERE course_id = ?
            ORDER BY created_at DESC
            LIMIT ? OFFSET ?
            "#
        )
        .bind(course_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_material)
            .collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM materials WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
