//! Equipment ratings by renters

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        rating::{CreateRating, Rating, RatingSummary},
        rental_request::{RentalRequest, RentalStatus},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct RatingsService {
    repository: Repository,
}

impl RatingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create(&self, user_id: Uuid, equipment_id: Uuid, data: CreateRating) -> AppResult<Rating> {
        data.validate()?;

        let request = self
            .repository
            .rental_requests
            .get_by_id(data.rental_request_id)
            .await?;
        check_rateable(&request, user_id, equipment_id)?;

        self.repository.ratings.create(equipment_id, user_id, &data).await
    }

    pub async fn list_for_equipment(&self, equipment_id: Uuid) -> AppResult<Vec<Rating>> {
        self.repository.equipment.get_by_id(equipment_id).await?;
        self.repository.ratings.list_for_equipment(equipment_id).await
    }

    pub async fn summary(&self, equipment_id: Uuid) -> AppResult<RatingSummary> {
        self.repository.equipment.get_by_id(equipment_id).await?;
        self.repository.ratings.summary(equipment_id).await
    }
}

/// Only the renter of a completed rental of this equipment may rate it
fn check_rateable(request: &RentalRequest, user_id: Uuid, equipment_id: Uuid) -> AppResult<()> {
    if request.user_id != user_id {
        return Err(AppError::Authorization(
            "Only the renter can rate this rental".to_string(),
        ));
    }
    if request.equipment_id != equipment_id {
        return Err(AppError::BadRequest(
            "Rental request does not concern this equipment".to_string(),
        ));
    }
    if request.status != RentalStatus::Completed {
        return Err(AppError::BusinessRule(
            "Only completed rentals can be rated".to_string(),
        ));
    }
    Ok(())
}
