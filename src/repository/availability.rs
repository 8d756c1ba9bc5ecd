//! Availability calendar repository

use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::availability::{AvailabilityBlock, NewAvailabilityBlock},
};

#[derive(Clone)]
pub struct AvailabilityRepository {
    pool: Pool<Postgres>,
}

impl AvailabilityRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// All blocks for an equipment, in saved order
    pub async fn list(&self, equipment_id: Uuid) -> AppResult<Vec<AvailabilityBlock>> {
        let blocks = sqlx::query_as::<_, AvailabilityBlock>(
            "SELECT * FROM availabilities WHERE equipment_id = $1 ORDER BY position",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blocks)
    }

    /// Delete every block of the equipment, then insert `blocks`, atomically
    pub async fn replace_all(
        &self,
        equipment_id: Uuid,
        blocks: &[NewAvailabilityBlock],
    ) -> AppResult<Vec<AvailabilityBlock>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM availabilities WHERE equipment_id = $1")
            .bind(equipment_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(blocks.len());
        if !blocks.is_empty() {
            let mut insert = QueryBuilder::<Postgres>::new(
                "INSERT INTO availabilities (id, equipment_id, start_date, end_date, status, position) ",
            );
            insert.push_values(blocks.iter().enumerate(), |mut row, (position, block)| {
                row.push_bind(Uuid::new_v4())
                    .push_bind(equipment_id)
                    .push_bind(block.start_date)
                    .push_bind(block.end_date)
                    .push_bind(block.status)
                    .push_bind(position as i32);
            });
            insert.push(" RETURNING *");

            saved = insert
                .build_query_as::<AvailabilityBlock>()
                .fetch_all(&mut *tx)
                .await?;
            saved.sort_by_key(|b| b.position);
        }

        tx.commit().await?;
        Ok(saved)
    }
}
