use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{AuthService, IssuedToken},
    domain::{CreateUserRequest, User},
    error::{AppError, Result},
    repository::UserRepository,
};

pub struct UserService {
    repo: Arc<dyn UserRepository>,
    auth: Arc<AuthService>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>, auth: Arc<AuthService>) -> Self {
        Self { repo, auth }
    }

    pub async fn register(&self, mut request: CreateUserRequest) -> Result<User> {
        request.email = request.email.trim().to_lowercase();
        request.username = request.username.trim().to_string();
        request.full_name = request.full_name.trim().to_string();
        request.validate()?;

        // Check for duplicate email
        if self.repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        // Check for duplicate username
        if self.repo.find_by_username(&request.username).await?.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let password_hash = AuthService::hash_password(&request.password).await?;
        let user = self.repo.create(request, password_hash).await?;

        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
        Ok(user)
    }

    /// Verify credentials and issue a bearer token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, IssuedToken)> {
        let email = email.trim().to_lowercase();
        let invalid = || AppError::Unauthorized("Incorrect email or password".to_string());

        let password_hash = self.repo.find_password_hash(&email).await?.ok_or_else(invalid)?;
        if !AuthService::verify_password(password, &password_hash).await? {
            return Err(invalid());
        }

        let user = self.repo.find_by_email(&email).await?.ok_or_else(invalid)?;
        if !user.is_active {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        let token = self.auth.issue_token(&user)?;
        Ok((user, token))
    }

    /// Resolve a bearer token to the active user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let user_id: Uuid = self.auth.validate_token(token)?;

        let user = self.repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User no longer exists".to_string()))?;

        if !user.is_active {
            return Err(AppError::Unauthorized("Account is inactive".to_string()));
        }

        Ok(user)
    }
}
