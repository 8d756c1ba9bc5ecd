//! Rental requests repository

use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        availability::{find_unavailable, AvailabilityBlock},
        equipment::{Equipment, EquipmentRow},
        rental_request::{
            find_overlap, total_price, CreateRentalRequest, DateRange, RentalRequest,
            RentalRequestDetails, RentalStatus,
        },
    },
};

const DETAILS_SELECT: &str = r#"
    SELECT r.*, e.name AS equipment_name
    FROM rental_requests r
    JOIN equipment e ON e.id = r.equipment_id
"#;

#[derive(Clone)]
pub struct RentalRequestsRepository {
    pool: Pool<Postgres>,
}

impl RentalRequestsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get rental request by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<RentalRequest> {
        sqlx::query_as::<_, RentalRequest>("SELECT * FROM rental_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental request {} not found", id)))
    }

    /// Requests submitted by a client
    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<RentalRequestDetails>> {
        let rows = sqlx::query_as::<_, RentalRequestDetails>(&format!(
            "{} WHERE r.user_id = $1 ORDER BY r.start_date DESC",
            DETAILS_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Requests received by an equipment owner
    pub async fn list_for_owner(&self, owner_id: Uuid) -> AppResult<Vec<RentalRequestDetails>> {
        let rows = sqlx::query_as::<_, RentalRequestDetails>(&format!(
            "{} WHERE r.equipment_owner_id = $1 ORDER BY r.start_date DESC",
            DETAILS_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Requests targeting one equipment item
    pub async fn list_for_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<RentalRequestDetails>> {
        let rows = sqlx::query_as::<_, RentalRequestDetails>(&format!(
            "{} WHERE r.equipment_id = $1 ORDER BY r.start_date",
            DETAILS_SELECT
        ))
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a PENDING request after checking the equipment calendar.
    ///
    /// The equipment row is locked for the duration of the transaction so
    /// concurrent requests for the same item are checked one after the other;
    /// the exclusion constraint on `rental_requests` backs this up.
    pub async fn create(
        &self,
        user_id: Uuid,
        data: &CreateRentalRequest,
    ) -> AppResult<(RentalRequest, Equipment)> {
        let range = DateRange::checked(data.start_date, data.end_date)?;

        let mut tx = self.pool.begin().await?;

        let equipment: Equipment =
            sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE id = $1 FOR UPDATE")
                .bind(data.equipment_id)
                .fetch_optional(&mut *tx)
                .await?
                .map(Equipment::from)
                .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", data.equipment_id)))?;

        if !equipment.is_requestable() {
            return Err(AppError::BusinessRule(
                "This equipment is not available for rent".to_string(),
            ));
        }
        if let Some(day) = equipment.blocked_day_in(&range) {
            return Err(AppError::BusinessRule(format!(
                "Equipment is not available on {}",
                day
            )));
        }
        if equipment.owner_id == user_id {
            return Err(AppError::BusinessRule(
                "You cannot rent your own equipment".to_string(),
            ));
        }

        let existing = sqlx::query_as::<_, RentalRequest>(
            r#"
            SELECT * FROM rental_requests
            WHERE equipment_id = $1
              AND status IN ('pending', 'approved', 'active')
              AND start_date <= $3 AND end_date >= $2
            "#,
        )
        .bind(equipment.id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(conflict) = find_overlap(&existing, equipment.id, &range) {
            return Err(AppError::Overlap(format!(
                "Equipment is already booked from {} to {}",
                conflict.start_date, conflict.end_date
            )));
        }

        let blocks = sqlx::query_as::<_, AvailabilityBlock>(
            "SELECT * FROM availabilities WHERE equipment_id = $1 ORDER BY position",
        )
        .bind(equipment.id)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(block) = find_unavailable(&blocks, &range) {
            return Err(AppError::BusinessRule(format!(
                "Equipment is unavailable from {} to {}",
                block.start_date, block.end_date
            )));
        }

        let request = sqlx::query_as::<_, RentalRequest>(
            r#"
            INSERT INTO rental_requests (
                id, equipment_id, user_id, equipment_owner_id,
                start_date, end_date, status, message, total_price
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(equipment.id)
        .bind(user_id)
        .bind(equipment.owner_id)
        .bind(range.start)
        .bind(range.end)
        .bind(RentalStatus::Pending)
        .bind(&data.message)
        .bind(total_price(equipment.price, &range))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::from_db(e, "Equipment is already booked for these dates"))?;

        tx.commit().await?;

        Ok((request, equipment))
    }

    /// Move a request from `from` to `to`, failing if it changed meanwhile.
    ///
    /// Entering ACTIVE marks the equipment as rented; COMPLETED releases it.
    pub async fn update_status(
        &self,
        id: Uuid,
        from: RentalStatus,
        to: RentalStatus,
    ) -> AppResult<RentalRequest> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, RentalRequest>(
            r#"
            UPDATE rental_requests SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| stale_status(id, from))?;

        let rented = match to {
            RentalStatus::Active => Some(true),
            RentalStatus::Completed => Some(false),
            _ => None,
        };
        if let Some(is_rented) = rented {
            sqlx::query("UPDATE equipment SET is_rented = $2, updated_at = NOW() WHERE id = $1")
                .bind(updated.equipment_id)
                .bind(is_rented)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Delete a request
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM rental_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Rental request {} not found", id)));
        }
        Ok(())
    }
}

/// A status update lost the race against another change to the same request
fn stale_status(id: Uuid, expected: RentalStatus) -> AppError {
    AppError::Conflict(format!("Rental request {} is no longer {}", id, expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};

    #[test]
    fn test_lost_status_race_is_a_conflict() {
        let err = stale_status(Uuid::new_v4(), RentalStatus::Pending);
        assert!(err.to_string().contains("no longer PENDING"));
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }
}
