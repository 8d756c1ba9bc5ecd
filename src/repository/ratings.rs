//! Ratings repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::rating::{CreateRating, Rating, RatingSummary},
};

#[derive(Clone)]
pub struct RatingsRepository {
    pool: Pool<Postgres>,
}

impl RatingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Store a rating for the equipment of a completed request
    pub async fn create(
        &self,
        equipment_id: Uuid,
        user_id: Uuid,
        data: &CreateRating,
    ) -> AppResult<Rating> {
        sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (id, equipment_id, user_id, rental_request_id, score, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(equipment_id)
        .bind(user_id)
        .bind(data.rental_request_id)
        .bind(data.score)
        .bind(&data.comment)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "This rental has already been rated"))
    }

    /// Ratings of an equipment, newest first
    pub async fn list_for_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<Rating>> {
        let ratings = sqlx::query_as::<_, Rating>(
            "SELECT * FROM ratings WHERE equipment_id = $1 ORDER BY created_at DESC",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }

    pub async fn summary(&self, equipment_id: Uuid) -> AppResult<RatingSummary> {
        let summary = sqlx::query_as::<_, RatingSummary>(
            r#"
            SELECT COUNT(*) AS count, AVG(score)::float8 AS average
            FROM ratings WHERE equipment_id = $1
            "#,
        )
        .bind(equipment_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(summary)
    }
}
