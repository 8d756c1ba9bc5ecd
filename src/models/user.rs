//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

/// Marketplace role chosen at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Client,
    Professional,
    Business,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "CLIENT",
            Role::Professional => "PROFESSIONAL",
            Role::Business => "BUSINESS",
            Role::Admin => "ADMIN",
        }
    }

    /// Roles allowed to publish equipment listings
    pub fn can_list_equipment(&self) -> bool {
        matches!(self, Role::Professional | Role::Business | Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity verification state of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "verification_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub is_active: bool,
    pub verification_status: VerificationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserShort {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub verification_status: VerificationStatus,
}

/// User query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct UserQuery {
    /// Search in email, first and last name
    pub name: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// CLIENT, PROFESSIONAL or BUSINESS (defaults to CLIENT)
    pub role: Option<Role>,
    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    pub company_name: Option<String>,
}

/// Update own profile request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[validate(length(max = 100, message = "First name is too long"))]
    pub first_name: Option<String>,
    #[validate(length(max = 100, message = "Last name is too long"))]
    pub last_name: Option<String>,
    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,
    pub company_name: Option<String>,
    /// Current password (required to change password)
    pub current_password: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: Option<String>,
}

/// Update role request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRole {
    pub role: Role,
}

/// Update account status request (admin only)
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserStatus {
    pub is_active: Option<bool>,
    pub verification_status: Option<VerificationStatus>,
}

/// Row counts removed by a cascading account deletion
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DeletionSummary {
    pub rental_requests: u64,
    pub equipment: u64,
    pub notifications: u64,
    pub ratings: u64,
    pub verification_documents: u64,
}

pub static PHONE_REGEX: once_cell::sync::Lazy<regex::Regex> = once_cell::sync::Lazy::new(|| {
    regex::Regex::new(r"^\+?[0-9 .\-]{6,20}$").expect("valid phone regex")
});

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User ID
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    /// Token ID, used for revocation on logout
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Allow the user themself or an admin
    pub fn require_self_or_admin(&self, user_id: Uuid) -> Result<(), AppError> {
        if self.sub == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("You can only access your own account".to_string()))
        }
    }

    pub fn require_equipment_lister(&self) -> Result<(), AppError> {
        if self.role.can_list_equipment() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Only professional or business accounts can list equipment".to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: Uuid::new_v4(),
            email: "jean@chantier.fr".to_string(),
            role,
            jti: Uuid::new_v4().to_string(),
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_roundtrip_keeps_role() {
        let original = claims(Role::Business);
        let token = original.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.sub, original.sub);
        assert_eq!(parsed.role, Role::Business);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut expired = claims(Role::Client);
        expired.exp = Utc::now().timestamp() - 3600;
        let token = expired.create_token("secret").unwrap();
        assert!(UserClaims::from_token(&token, "secret").is_err());
    }

    #[test]
    fn test_permissions() {
        let client = claims(Role::Client);
        assert!(client.require_admin().is_err());
        assert!(client.require_equipment_lister().is_err());
        assert!(client.require_self_or_admin(client.sub).is_ok());
        assert!(client.require_self_or_admin(Uuid::new_v4()).is_err());

        let admin = claims(Role::Admin);
        assert!(admin.require_admin().is_ok());
        assert!(admin.require_self_or_admin(Uuid::new_v4()).is_ok());
        assert!(claims(Role::Professional).require_equipment_lister().is_ok());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Professional).unwrap(), "\"PROFESSIONAL\"");
        let role: Role = serde_json::from_str("\"BUSINESS\"").unwrap();
        assert_eq!(role, Role::Business);
        assert!(serde_json::from_str::<Role>("\"OWNER\"").is_err());
        assert_eq!(
            serde_json::to_string(&VerificationStatus::Unverified).unwrap(),
            "\"UNVERIFIED\""
        );
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterUser {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            role: None,
            first_name: None,
            last_name: None,
            phone: Some("+33 6 12 34 56 78".to_string()),
            company_name: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(!fields.contains_key("phone"));
    }
}
