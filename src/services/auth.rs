//! Registration, login and own-profile management

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, Role, UpdateProfile, User, UserClaims},
    repository::Repository,
};

use super::redis::RedisService;

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
    redis: RedisService,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig, redis: RedisService) -> Self {
        Self { repository, config, redis }
    }

    /// Create an account and return a session token for it
    pub async fn register(&self, data: RegisterUser) -> AppResult<(String, User)> {
        data.validate()?;

        let role = data.role.unwrap_or(Role::Client);
        if role == Role::Admin {
            return Err(AppError::Authorization(
                "Administrator accounts cannot be self-registered".to_string(),
            ));
        }
        if self.repository.users.email_exists(&data.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let hash = hash_password(&data.password)?;
        let user = self.repository.users.create(&data, role, &hash).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user registered");

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// Authenticate by email and password
    pub async fn login(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(&user.password_hash, password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }
        if !user.is_active {
            return Err(AppError::Authentication("Account is disabled".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::debug!(user_id = %user.id, "user logged in");
        Ok((token, user))
    }

    /// Revoke the token carried by `claims`
    pub async fn logout(&self, claims: &UserClaims) -> AppResult<()> {
        let remaining = (claims.exp - Utc::now().timestamp()).max(0) as u64;
        self.redis.revoke_token(&claims.jti, remaining).await
    }

    pub async fn is_revoked(&self, claims: &UserClaims) -> AppResult<bool> {
        self.redis.is_token_revoked(&claims.jti).await
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(user_id).await
    }

    /// Update own profile; a new password requires the current one
    pub async fn update_profile(&self, user_id: Uuid, profile: UpdateProfile) -> AppResult<User> {
        profile.validate()?;

        let password_hash = match profile.new_password {
            Some(ref new_password) => {
                let current = profile.current_password.as_deref().ok_or_else(|| {
                    AppError::Validation("Current password is required to set a new one".to_string())
                })?;
                let user = self.repository.users.get_by_id(user_id).await?;
                if !verify_password(&user.password_hash, current)? {
                    return Err(AppError::Authentication("Current password is incorrect".to_string()));
                }
                Some(hash_password(new_password)?)
            }
            None => None,
        };

        self.repository
            .users
            .update_profile(user_id, &profile, password_hash)
            .await
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = UserClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            jti: Uuid::new_v4().to_string(),
            exp: now + (self.config.jwt_expiration_hours as i64 * 3600),
            iat: now,
        };
        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

pub fn verify_password(hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
