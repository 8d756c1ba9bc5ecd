//! In-app notifications

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub related_request_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

/// Notification to be stored
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub kind: &'static str,
    pub title: String,
    pub body: String,
    pub related_request_id: Option<Uuid>,
}

pub const KIND_RENTAL_REQUESTED: &str = "rental_requested";
pub const KIND_RENTAL_STATUS: &str = "rental_status";
pub const KIND_VERIFICATION: &str = "verification";
