//! Equipment ratings (reviews)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Rating {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub user_id: Uuid,
    pub rental_request_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRating {
    /// Completed rental this review refers to
    pub rental_request_id: Uuid,
    #[validate(range(min = 1, max = 5, message = "Score must be between 1 and 5"))]
    pub score: i16,
    #[validate(length(max = 2000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RatingSummary {
    pub count: i64,
    /// Average score, absent when there are no ratings
    pub average: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bounds() {
        let rating = |score| CreateRating {
            rental_request_id: Uuid::new_v4(),
            score,
            comment: None,
        };
        assert!(rating(0).validate().is_err());
        assert!(rating(1).validate().is_ok());
        assert!(rating(5).validate().is_ok());
        assert!(rating(6).validate().is_err());
    }
}
