use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    config::AuthConfig,
    domain::User,
    error::{AppError, Result},
};

pub mod token;

pub use token::{Claims, IssuedToken};

pub struct AuthService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    token_duration: Duration,
}

impl AuthService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            issuer: config.jwt_issuer.clone(),
            token_duration: Duration::minutes(config.token_duration_minutes),
        }
    }

    pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub async fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Signs an HS256 access token for `user`.
    pub fn issue_token(&self, user: &User) -> Result<IssuedToken> {
        let now = Utc::now();
        let expires_at = now + self.token_duration;
        let claims = Claims {
            sub: user.id.to_string(),
            role: user.role,
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let access_token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token signing failed: {}", e)))?;

        Ok(IssuedToken {
            access_token,
            expires_at,
        })
    }

    /// Checks signature, issuer and expiry, returning the subject user id.
    pub fn validate_token(&self, token: &str) -> Result<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Rejected bearer token: {}", e);
                AppError::Unauthorized("Invalid or expired token".to_string())
            })?;

        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn service(minutes: i64) -> AuthService {
        AuthService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "courseboard-test".to_string(),
            token_duration_minutes: minutes,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "prof@example.com".to_string(),
            username: "prof".to_string(),
            full_name: "Professor".to_string(),
            role: Role::Professor,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn issued_token_validates_to_its_subject() {
        let auth = service(30);
        let user = user();

        let issued = auth.issue_token(&user).unwrap();
        assert_eq!(auth.validate_token(&issued.access_token).unwrap(), user.id);
    }

    #[test]
    fn expired_token_is_rejected() {
        let auth = service(-5);
        let issued = auth.issue_token(&user()).unwrap();

        assert!(matches!(
            auth.validate_token(&issued.access_token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn token_from_another_issuer_is_rejected() {
        let issued = service(30).issue_token(&user()).unwrap();
        let other = AuthService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_issuer: "someone-else".to_string(),
            token_duration_minutes: 30,
        });

        assert!(other.validate_token(&issued.access_token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(service(30).validate_token("not-a-jwt").is_err());
    }

    #[tokio::test]
    async fn password_hash_verifies_only_the_original() {
        let hash = AuthService::hash_password("correct horse").await.unwrap();

        assert!(AuthService::verify_password("correct horse", &hash).await.unwrap());
        assert!(!AuthService::verify_password("battery staple", &hash).await.unwrap());
    }
}
