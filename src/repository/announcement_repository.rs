use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Announcement, AnnouncementView, CreateAnnouncement, ReactionType, Role,
        UpdateAnnouncement, UserSummary,
    },
    error::{AppError, Result},
    repository::{parse_id, to_utc, AnnouncementRepository},
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    course_id: String,
    author_id: String,
    title: String,
    content: String,
    image_path: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct AnnouncementViewRow {
    #[sqlx(flatten)]
    announcement: AnnouncementRow,
    author_username: String,
    author_full_name: String,
    author_role: String,
    like_count: i64,
    dislike_count: i64,
    comment_count: i64,
    user_reaction: Option<String>,
}

// Counts are aggregated on every read; nothing keeps running totals.
// The single bind parameter is the viewing user's id.
const VIEW_SELECT: &str = r#"
    SELECT a.id, a.course_id, a.author_id, a.title, a.content, a.image_path,
           a.created_at, a.updated_at,
           u.username AS author_username,
           u.full_name AS author_full_name,
           u.role AS author_role,
           (SELECT COUNT(*) FROM reactions r
             WHERE r.announcement_id = a.id AND r.reaction_type = 'like') AS like_count,
           (SELECT COUNT(*) FROM reactions r
             WHERE r.announcement_id = a.id AND r.reaction_type = 'dislike') AS dislike_count,
           (SELECT COUNT(*) FROM comments c
             WHERE c.announcement_id = a.id) AS comment_count,
           (SELECT r.reaction_type FROM reactions r
             WHERE r.announcement_id = a.id AND r.user_id = ?) AS user_reaction
    FROM announcements a
    JOIN users u ON u.id = a.author_id
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        Ok(Announcement {
            id: parse_id(&row.id)?,
            course_id: parse_id(&row.course_id)?,
            author_id: parse_id(&row.author_id)?,
            title: row.title,
            content: row.content,
            image_path: row.image_path,
            created_at: to_utc(row.created_at),
            updated_at: to_utc(row.updated_at),
        })
    }

    fn row_to_view(row: AnnouncementViewRow) -> Result<AnnouncementView> {
        let announcement = Self::row_to_announcement(row.announcement)?;
        let author = UserSummary {
            id: announcement.author_id,
            username: row.author_username,
            full_name: row.author_full_name,
            role: row.author_role.parse::<Role>().map_err(AppError::Database)?,
        };
        let user_reaction = row
            .user_reaction
            .map(|r| r.parse::<ReactionType>().map_err(AppError::Database))
            .transpose()?;

        Ok(AnnouncementView {
            announcement,
            author,
            like_count: row.like_count,
            dislike_count: row.dislike_count,
            comment_count: row.comment_count,
            user_reaction,
        })
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(
        &self,
        author_id: Uuid,
        announcement: CreateAnnouncement,
        image_path: Option<String>,
    ) -> Result<Announcement> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, course_id, author_id, title, content, image_path,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(announcement.course_id.to_string())
        .bind(author_id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(&image_path)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(
            r#"
            SELECT id, course_id, author_id, title, content, image_path,
                   created_at, updated_at
            FROM announcements
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn find_view(&self, id: Uuid, viewer_id: Uuid) -> Result<Option<AnnouncementView>> {
        let row = sqlx::query_as::<_, AnnouncementViewRow>(&format!(
            "{} WHERE a.id = ?",
            VIEW_SELECT
        ))
        .bind(viewer_id.to_string())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        row.map(Self::row_to_view).transpose()
    }

    async fn list_for_course(
        &self,
        course_id: Uuid,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnnouncementView>> {
        let rows = sqlx::query_as::<_, AnnouncementViewRow>(&format!(
            "{} WHERE a.course_id = ? ORDER BY a.created_at DESC LIMIT ? OFFSET ?",
            VIEW_SELECT
        ))
        .bind(viewer_id.to_string())
        .bind(course_id.to_string())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        rows.into_iter()
            .map(Self::row_to_view)
            .collect()
    }

    async fn update(
        &self,
        id: Uuid,
        update: UpdateAnnouncement,
        image_path: Option<String>,
    ) -> Result<Announcement> {
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE announcements
            SET title = COALESCE(?, title),
                content = COALESCE(?, content),
                image_path = COALESCE(?, image_path),
                updated_at = ?
            WHERE id = ?
            "#
        )
        .bind(&update.title)
        .bind(&update.content)
        .bind(&image_path)
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::NotFound("Announcement not found".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let id_str = id.to_string();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM reactions WHERE announcement_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM comments WHERE announcement_id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(&id_str)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
