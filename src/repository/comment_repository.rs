use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Comment, CommentWithAuthor, Role, UserSummary},
    error::{AppError, Result},
    repository::{parse_id, to_utc, CommentRepository},
};

#[derive(FromRow)]
struct CommentRow {
    id: String,
    announcement_id: String,
    author_id: String,
    content: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CommentAuthorRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_username: String,
    author_full_name: String,
    author_role: String,
}

const WITH_AUTHOR_SELECT: &str = r#"
    SELECT c.id, c.announcement_id, c.author_id, c.content, c.created_at, c.updated_at,
           u.username AS author_username,
           u.full_name AS author_full_name,
           u.role AS author_role
    FROM comments c
    JOIN users u ON u.id = c.author_id
"#;

pub struct SqliteCommentRepository {
    pool: SqlitePool,
}

impl SqliteCommentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_comment(row: CommentRow) -> Result<Comment> {
        Ok(Comment {
            id: parse_id(&row.id)?,
            announcement_id: parse_id(&row.announcement_id)?,
            author_id: parse_id(&row.author_id)?,
            content: row.content,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }

    fn row_to_comment_with_author(row: CommentAuthorRow) -> Result<CommentWithAuthor> {
        let comment = Self::row_to_comment(row.comment)?;
        let author = UserSummary {
            id: comment.author_id,
            username: row.author_username,
            full_name: row.author_full_name,
            role: row.author_role.parse::<Role>().map_err(AppError::Database)?,
        };

        Ok(CommentWithAuthor { comment, author })
    }
}

#[async_trait]
impl CommentRepository for SqliteCommentRepository {
    async fn create(&self, announcement_id: Uuid, author_id: Uuid, content: &str) -> Result<CommentWithAuthor> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO comments (id, announcement_id, author_id, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(announcement_id.to_string())
        .bind(author_id.to_string())
        .bind(content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_with_author(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created comment".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, announcement_id, author_id, content, created_at, updated_at
            FROM comments
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_comment).transpose()
    }

    async fn find_with_author(&self, id: Uuid) -> Result<Option<CommentWithAuthor>> {
        let row = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            "{} WHERE c.id = ?",
            WITH_AUTHOR_SELECT
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_comment_with_author).transpose()
    }

    async fn list_for_announcement(
        &self,
        announcement_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query_as::<_, CommentAuthorRow>(&format!(
            "{} WHERE c.announcement_id = ? ORDER BY c.created_at ASC LIMIT ? OFFSET ?",
            WITH_AUTHOR_SELECT
        ))
        .bind(announcement_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_comment_with_author)
            .collect()
    }

    async fn update(&self, id: Uuid, content: &str) -> Result<CommentWithAuthor> {
        sqlx::query("UPDATE comments SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now().naive_utc())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_with_author(id).await?.ok_or_else(|| {
            AppError::NotFound("Comment not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
