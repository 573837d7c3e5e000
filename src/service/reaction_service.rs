use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Announcement, Reaction, ReactionType, Role, User},
    error::{AppError, Result},
    repository::{AnnouncementRepository, ReactionRepository},
    service::access::{require_role, AccessGuard},
};

pub struct ReactionService {
    reactions: Arc<dyn ReactionRepository>,
    announcements: Arc<dyn AnnouncementRepository>,
    guard: AccessGuard,
}

impl ReactionService {
    pub fn new(
        reactions: Arc<dyn ReactionRepository>,
        announcements: Arc<dyn AnnouncementRepository>,
        guard: AccessGuard,
    ) -> Self {
        Self { reactions, announcements, guard }
    }

    /// Set the user's reaction on an announcement, replacing any earlier one.
    pub async fn react(&self, user: &User, announcement_id: Uuid, reaction_type: &str) -> Result<Reaction> {
        let announcement = self.authorize(user, announcement_id, "react to announcements").await?;

        let reaction_type = reaction_type
            .parse::<ReactionType>()
            .map_err(AppError::Validation)?;

        self.reactions.upsert(user.id, announcement.id, reaction_type).await
    }

    pub async fn remove(&self, user: &User, announcement_id: Uuid) -> Result<()> {
        let announcement = self.authorize(user, announcement_id, "remove reactions").await?;

        if !self.reactions.delete(user.id, announcement.id).await? {
            return Err(AppError::NotFound("No reaction found to remove".to_string()));
        }

        Ok(())
    }

    async fn authorize(&self, user: &User, announcement_id: Uuid, action: &str) -> Result<Announcement> {
        require_role(user, Role::Student, action)?;

        let announcement = self.announcements
            .find_by_id(announcement_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))?;

        self.guard.require_enrollment(user, announcement.course_id).await?;
        Ok(announcement)
    }
}
