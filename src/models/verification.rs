//! Verification documents and their audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::user::VerificationStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_type", rename_all = "snake_case")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Identity,
    BusinessRegistration,
    Insurance,
    Other,
}

impl std::str::FromStr for DocumentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IDENTITY" => Ok(DocumentType::Identity),
            "BUSINESS_REGISTRATION" => Ok(DocumentType::BusinessRegistration),
            "INSURANCE" => Ok(DocumentType::Insurance),
            "OTHER" => Ok(DocumentType::Other),
            _ => Err(format!("Invalid document type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
}

impl DocumentStatus {
    /// Account verification status implied by a reviewed document
    pub fn account_status(&self) -> VerificationStatus {
        match self {
            DocumentStatus::Pending => VerificationStatus::Pending,
            DocumentStatus::Approved => VerificationStatus::Verified,
            DocumentStatus::Rejected => VerificationStatus::Rejected,
        }
    }
}

/// Uploaded identity/business document
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VerificationDocument {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    /// Hex-encoded SHA-256 of the file content
    pub sha256: String,
    #[serde(skip_serializing, default)]
    pub storage_key: String,
    pub status: DocumentStatus,
    pub reviewed_by: Option<Uuid>,
    pub review_comment: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Admin decision on a document
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReviewDocument {
    /// APPROVED or REJECTED
    pub status: DocumentStatus,
    pub comment: Option<String>,
}

/// Entry of the verification audit trail
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct VerificationHistoryEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub document_id: Option<Uuid>,
    /// "uploaded", "approved", "rejected" or "status_changed"
    pub action: String,
    pub status: VerificationStatus,
    pub actor_id: Option<Uuid>,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
