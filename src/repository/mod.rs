use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::{AppError, Result};

pub mod user_repository;
pub mod course_repository;
pub mod enrollment_repository;
pub mod announcement_repository;
pub mod reaction_repository;
pub mod comment_repository;
pub mod material_repository;

pub use user_repository::SqliteUserRepository;
pub use course_repository::SqliteCourseRepository;
pub use enrollment_repository::SqliteEnrollmentRepository;
pub use announcement_repository::SqliteAnnouncementRepository;
pub use reaction_repository::SqliteReactionRepository;
pub use comment_repository::SqliteCommentRepository;
pub use material_repository::SqliteMaterialRepository;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, request: CreateUserRequest, password_hash: String) -> Result<User>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_password_hash(&self, email: &str) -> Result<Option<String>>;
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, request: CreateCourseRequest) -> Result<Course>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Course>>;
    async fn list_active(&self, limit: i64, offset: i64) -> Result<Vec<Course>>;
}

#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Inserts the (user, course) pair unless it already exists or the user
    /// is at `MAX_ENROLLMENTS_PER_USER`. Both cases are `AppError::Conflict`,
    /// decided atomically by the store.
    async fn enroll(&self, user_id: Uuid, course_id: Uuid) -> Result<Enrollment>;
    async fn unenroll(&self, user_id: Uuid, course_id: Uuid) -> Result<bool>;
    async fn is_enrolled(&self, user_id: Uuid, course_id: Uuid) -> Result<bool>;
    async fn count_for_user(&self, user_id: Uuid) -> Result<i64>;
    async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<EnrollmentWithCourse>>;
}

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    async fn create(
        &self,
        author_id: Uuid,
        announcement: CreateAnnouncement,
        image_path: Option<String>,
    ) -> Result<Announcement>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>>;
    async fn find_view(&self, id: Uuid, viewer_id: Uuid) -> Result<Option<AnnouncementView>>;
    async fn list_for_course(
        &self,
        course_id: Uuid,
        viewer_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<AnnouncementView>>;
    async fn update(
        &self,
        id: Uuid,
        update: UpdateAnnouncement,
        image_path: Option<String>,
    ) -> Result<Announcement>;
    /// Removes the announcement together with its reactions and comments.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    async fn upsert(
        &self,
        user_id: Uuid,
        announcement_id: Uuid,
        reaction_type: ReactionType,
    ) -> Result<Reaction>;
    async fn find(&self, user_id: Uuid, announcement_id: Uuid) -> Result<Option<Reaction>>;
    async fn delete(&self, user_id: Uuid, announcement_id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn create(&self, announcement_id: Uuid, author_id: Uuid, content: &str) -> Result<CommentWithAuthor>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>>;
    async fn find_with_author(&self, id: Uuid) -> Result<Option<CommentWithAuthor>>;
    async fn list_for_announcement(
        &self,
        announcement_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CommentWithAuthor>>;
    async fn update(&self, id: Uuid, content: &str) -> Result<CommentWithAuthor>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Location and metadata of a file already written to the upload store.
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub path: String,
    pub file_name: String,
    pub size: i64,
}

#[async_trait]
pub trait MaterialRepository: Send + Sync {
    async fn create(&self, author_id: Uuid, material: CreateMaterial, file: StoredFile) -> Result<Material>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Material>>;
    async fn list_for_course(&self, course_id: Uuid, limit: i64, offset: i64) -> Result<Vec<Material>>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub(crate) fn parse_id(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| AppError::Database(e.to_string()))
}

pub(crate) fn to_utc(dt: NaiveDateTime) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(dt, Utc)
}
