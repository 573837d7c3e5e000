use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementView, CreateAnnouncement, Role, UpdateAnnouncement, User},
    error::{AppError, Result},
    repository::AnnouncementRepository,
    service::{access::{require_owner, require_role, AccessGuard}, require_text, Page},
    uploads::{FileStore, UploadKind, UploadedFile},
};

pub struct AnnouncementService {
    repo: Arc<dyn AnnouncementRepository>,
    files: Arc<FileStore>,
    guard: AccessGuard,
}

impl AnnouncementService {
    pub fn new(
        repo: Arc<dyn AnnouncementRepository>,
        files: Arc<FileStore>,
        guard: AccessGuard,
    ) -> Self {
        Self { repo, files, guard }
    }

    pub async fn list_for_course(
        &self,
        user: &User,
        course_id: Uuid,
        page: Page,
    ) -> Result<Vec<AnnouncementView>> {
        self.guard.require_enrollment(user, course_id).await?;
        self.repo.list_for_course(course_id, user.id, page.limit, page.offset).await
    }

    pub async fn get(&self, user: &User, id: Uuid) -> Result<AnnouncementView> {
        let view = self.find_view(id, user.id).await?;
        self.guard.require_enrollment(user, view.announcement.course_id).await?;
        Ok(view)
    }

    pub async fn create(
        &self,
        user: &User,
        request: CreateAnnouncement,
        image: Option<UploadedFile>,
    ) -> Result<AnnouncementView> {
        require_role(user, Role::Professor, "create announcements")?;
        self.guard.require_enrollment(user, request.course_id).await?;

        let request = CreateAnnouncement {
            course_id: request.course_id,
            title: require_text(&request.title, "Title")?,
            content: require_text(&request.content, "Content")?,
        };

        let image_path = match image {
            Some(ref upload) => Some(self.files.save(UploadKind::Image, upload).await?.path),
            None => None,
        };

        let announcement = match self.repo.create(user.id, request, image_path.clone()).await {
            Ok(announcement) => announcement,
            Err(e) => {
                if let Some(ref path) = image_path {
                    self.discard_file(path).await;
                }
                return Err(e);
            }
        };

        tracing::info!(
            announcement_id = %announcement.id,
            course_id = %announcement.course_id,
            "Created announcement"
        );

        self.find_view(announcement.id, user.id).await
    }

    pub async fn update(
        &self,
        user: &User,
        id: Uuid,
        request: UpdateAnnouncement,
        image: Option<UploadedFile>,
    ) -> Result<AnnouncementView> {
        require_role(user, Role::Professor, "update announcements")?;
        let existing = self.find(id).await?;
        require_owner(user, existing.author_id, "announcements")?;
        self.guard.require_enrollment(user, existing.course_id).await?;

        let request = UpdateAnnouncement {
            title: request.title.as_deref().map(|t| require_text(t, "Title")).transpose()?,
            content: request.content.as_deref().map(|c| require_text(c, "Content")).transpose()?,
        };

        let new_image = match image {
            Some(ref upload) => Some(self.files.save(UploadKind::Image, upload).await?.path),
            None => None,
        };

        if let Err(e) = self.repo.update(id, request, new_image.clone()).await {
            if let Some(ref path) = new_image {
                self.discard_file(path).await;
            }
            return Err(e);
        }

        // The replaced image is no longer referenced by anything.
        if let (Some(_), Some(old)) = (&new_image, &existing.image_path) {
            self.discard_file(old).await;
        }

        self.find_view(id, user.id).await
    }

    pub async fn delete(&self, user: &User, id: Uuid) -> Result<()> {
        require_role(user, Role::Professor, "delete announcements")?;
        let existing = self.find(id).await?;
        require_owner(user, existing.author_id, "announcements")?;
        self.guard.require_enrollment(user, existing.course_id).await?;

        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        if let Some(ref path) = existing.image_path {
            self.discard_file(path).await;
        }

        tracing::info!(announcement_id = %id, "Deleted announcement");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Announcement> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    async fn find_view(&self, id: Uuid, viewer_id: Uuid) -> Result<AnnouncementView> {
        self.repo
            .find_view(id, viewer_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    async fn discard_file(&self, path: &str) {
        if let Err(e) = self.files.delete(path).await {
            tracing::warn!("Failed to remove announcement image {}: {}", path, e);
        }
    }
}
