use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Reaction, ReactionType},
    error::{AppError, Result},
    repository::{parse_id, to_utc, ReactionRepository},
};

#[derive(FromRow)]
struct ReactionRow {
    id: String,
    user_id: String,
    announcement_id: String,
    reaction_type: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

pub struct SqliteReactionRepository {
    pool: SqlitePool,
}

impl SqliteReactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_reaction(row: ReactionRow) -> Result<Reaction> {
        Ok(Reaction {
            id: parse_id(&row.id)?,
            user_id: parse_id(&row.user_id)?,
            announcement_id: parse_id(&row.announcement_id)?,
            reaction_type: row.reaction_type.parse::<ReactionType>().map_err(AppError::Database)?,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }
}

#[async_trait]
impl ReactionRepository for SqliteReactionRepository {
    async fn upsert(
        &self,
        user_id: Uuid,
        announcement_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<Reaction> {
        let now = Utc::now().naive_utc();

        // Concurrent reactions from one user collapse onto the same row.
        sqlx::query(
            r#"
            INSERT INTO reactions (id, user_id, announcement_id, reaction_type, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, announcement_id)
            DO UPDATE SET reaction_type = excluded.reaction_type, updated_at = excluded.updated_at
            "#
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(announcement_id.to_string())
        .bind(reaction_type.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find(user_id, announcement_id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve reaction".to_string())
        })
    }

    async fn find(&self, user_id: Uuid, announcement_id: Uuid) -> Result<Option<Reaction>> {
        let row = sqlx::query_as::<_, ReactionRow>(
            r#"
            SELECT id, user_id, announcement_id, reaction_type, created_at, updated_at
            FROM reactions
            WHERE user_id = ? AND announcement_id = ?
            "#
        )
        .bind(user_id.to_string())
        .bind(announcement_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_reaction).transpose()
    }

    async fn delete(&self, user_id: Uuid, announcement_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM reactions WHERE user_id = ? AND announcement_id = ?")
            .bind(user_id.to_string())
            .bind(announcement_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}
