use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Announcement, Comment, CommentWithAuthor, Role, User},
    error::{AppError, Result},
    repository::{AnnouncementRepository, CommentRepository},
    service::{access::{require_owner, require_role, AccessGuard}, require_text, Page},
};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    announcements: Arc<dyn AnnouncementRepository>,
    guard: AccessGuard,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        announcements: Arc<dyn AnnouncementRepository>,
        guard: AccessGuard,
    ) -> Self {
        Self { comments, announcements, guard }
    }

    pub async fn list(&self, user: &User, announcement_id: Uuid, page: Page) -> Result<Vec<CommentWithAuthor>> {
        let announcement = self.announcement(announcement_id).await?;
        self.guard.require_enrollment(user, announcement.course_id).await?;

        self.comments
            .list_for_announcement(announcement.id, page.limit, page.offset)
            .await
    }

    pub async fn create(&self, user: &User, announcement_id: Uuid, content: &str) -> Result<CommentWithAuthor> {
        require_role(user, Role::Student, "comment on announcements")?;
        let announcement = self.announcement(announcement_id).await?;
        self.guard.require_enrollment(user, announcement.course_id).await?;

        let content = require_text(content, "Content")?;
        self.comments.create(announcement.id, user.id, &content).await
    }

    pub async fn update(&self, user: &User, comment_id: Uuid, content: &str) -> Result<CommentWithAuthor> {
        let comment = self.authorize_owner(user, comment_id).await?;

        let content = require_text(content, "Content")?;
        self.comments.update(comment.id, &content).await
    }

    pub async fn delete(&self, user: &User, comment_id: Uuid) -> Result<()> {
        let comment = self.authorize_owner(user, comment_id).await?;

        if !self.comments.delete(comment.id).await? {
            return Err(AppError::NotFound("Comment not found".to_string()));
        }
        Ok(())
    }

    async fn authorize_owner(&self, user: &User, comment_id: Uuid) -> Result<Comment> {
        let comment = self.comments
            .find_by_id(comment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

        require_owner(user, comment.author_id, "comments")?;

        let announcement = self.announcement(comment.announcement_id).await?;
        self.guard.require_enrollment(user, announcement.course_id).await?;

        Ok(comment)
    }

    async fn announcement(&self, id: Uuid) -> Result<Announcement> {
        self.announcements
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }
}
