use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ReactionType, UserSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    pub id: Uuid,
    pub course_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub content: String,
    pub image_path: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An announcement as seen by one user: aggregated reaction and comment
/// counts plus that user's own reaction, if any.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnouncementView {
    #[serde(flatten)]
    pub announcement: Announcement,
    pub author: UserSummary,
    pub like_count: i64,
    pub dislike_count: i64,
    pub comment_count: i64,
    pub user_reaction: Option<ReactionType>,
}

#[derive(Debug, Clone)]
pub struct CreateAnnouncement {
    pub course_id: Uuid,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAnnouncement {
    pub title: Option<String>,
    pub content: Option<String>,
}
