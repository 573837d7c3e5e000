//! Authorization checks shared by every course-scoped operation.
//!
//! Services call these in a fixed order: role, then resource lookup and
//! ownership, then enrollment. The first failing check decides the error.
//! Authentication itself happens earlier, in the API middleware.

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{Role, User},
    error::{AppError, Result},
    repository::EnrollmentRepository,
};

pub fn require_role(user: &User, role: Role, action: &str) -> Result<()> {
    if user.role != role {
        return Err(AppError::Forbidden(format!("Only {}s can {}", role, action)));
    }
    Ok(())
}

pub fn require_owner(user: &User, owner_id: Uuid, resource: &str) -> Result<()> {
    if user.id != owner_id {
        return Err(AppError::Forbidden(format!(
            "Can only modify your own {}",
            resource
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct AccessGuard {
    enrollments: Arc<dyn EnrollmentRepository>,
}

impl AccessGuard {
    pub fn new(enrollments: Arc<dyn EnrollmentRepository>) -> Self {
        Self { enrollments }
    }

    pub async fn require_enrollment(&self, user: &User, course_id: Uuid) -> Result<()> {
        if !self.enrollments.is_enrolled(user.id, course_id).await? {
            return Err(AppError::Forbidden("Not enrolled in this course".to_string()));
        }
        Ok(())
    }
}
