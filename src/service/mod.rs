pub mod access;
pub mod user_service;
pub mod course_service;
pub mod announcement_service;
pub mod reaction_service;
pub mod comment_service;
pub mod material_service;

use std::sync::Arc;
use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::error::{AppError, Result};
use crate::repository::*;
use crate::uploads::FileStore;
use access::AccessGuard;
use announcement_service::AnnouncementService;
use comment_service::CommentService;
use course_service::CourseService;
use material_service::MaterialService;
use reaction_service::ReactionService;
use user_service::UserService;

/// Default and maximum page size for list endpoints.
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        Self {
            limit: limit.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Trims `value` and rejects it when nothing is left.
pub(crate) fn require_text(value: &str, field: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub course_repo: Arc<dyn CourseRepository>,
    pub enrollment_repo: Arc<dyn EnrollmentRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub reaction_repo: Arc<dyn ReactionRepository>,
    pub comment_repo: Arc<dyn CommentRepository>,
    pub material_repo: Arc<dyn MaterialRepository>,
    pub auth_service: Arc<AuthService>,
    pub file_store: Arc<FileStore>,
    pub user_service: Arc<UserService>,
    pub course_service: Arc<CourseService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub reaction_service: Arc<ReactionService>,
    pub comment_service: Arc<CommentService>,
    pub material_service: Arc<MaterialService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        auth_service: Arc<AuthService>,
        file_store: Arc<FileStore>,
        db_pool: SqlitePool,
    ) -> Self {
        let user_repo: Arc<dyn UserRepository> = Arc::new(SqliteUserRepository::new(db_pool.clone()));
        let course_repo: Arc<dyn CourseRepository> = Arc::new(SqliteCourseRepository::new(db_pool.clone()));
        let enrollment_repo: Arc<dyn EnrollmentRepository> = Arc::new(SqliteEnrollmentRepository::new(db_pool.clone()));
        let announcement_repo: Arc<dyn AnnouncementRepository> = Arc::new(SqliteAnnouncementRepository::new(db_pool.clone()));
        let reaction_repo: Arc<dyn ReactionRepository> = Arc::new(SqliteReactionRepository::new(db_pool.clone()));
        let comment_repo: Arc<dyn CommentRepository> = Arc::new(SqliteCommentRepository::new(db_pool.clone()));
        let material_repo: Arc<dyn MaterialRepository> = Arc::new(SqliteMaterialRepository::new(db_pool.clone()));

        let guard = AccessGuard::new(enrollment_repo.clone());

        let user_service = Arc::new(UserService::new(user_repo.clone(), auth_service.clone()));
        let course_service = Arc::new(CourseService::new(course_repo.clone(), enrollment_repo.clone()));
        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            file_store.clone(),
            guard.clone(),
        ));
        let reaction_service = Arc::new(ReactionService::new(
            reaction_repo.clone(),
            announcement_repo.clone(),
            guard.clone(),
        ));
        let comment_service = Arc::new(CommentService::new(
            comment_repo.clone(),
            announcement_repo.clone(),
            guard.clone(),
        ));
        let material_service = Arc::new(MaterialService::new(
            material_repo.clone(),
            file_store.clone(),
            guard,
        ));

        Self {
            user_repo,
            course_repo,
            enrollment_repo,
            announcement_repo,
            reaction_repo,
            comment_repo,
            material_repo,
            auth_service,
            file_store,
            user_service,
            course_service,
            announcement_service,
            reaction_service,
            comment_service,
            material_service,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_defaults_and_clamps() {
        assert_eq!(Page::default(), Page { limit: 100, offset: 0 });
        assert_eq!(Page::new(Some(500), Some(-3)), Page { limit: 100, offset: 0 });
        assert_eq!(Page::new(Some(0), Some(20)), Page { limit: 1, offset: 20 });
    }

    #[test]
    fn require_text_trims_and_rejects_blank() {
        assert_eq!(require_text("  hi ", "Title").unwrap(), "hi");
        assert!(matches!(require_text(" \n", "Title"), Err(AppError::Validation(_))));
    }
}
