//! Availability calendar of an equipment item

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        availability::{validate_blocks, AvailabilityBlock, NewAvailabilityBlock},
        user::UserClaims,
    },
    repository::Repository,
};

use super::equipment::ensure_owner;

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Blocks of the equipment in the order they were saved
    pub async fn get(&self, equipment_id: Uuid) -> AppResult<Vec<AvailabilityBlock>> {
        self.repository.equipment.get_by_id(equipment_id).await?;
        self.repository.availability.list(equipment_id).await
    }

    /// Replace the whole calendar with `blocks`
    pub async fn replace_all(
        &self,
        claims: &UserClaims,
        equipment_id: Uuid,
        blocks: Vec<NewAvailabilityBlock>,
    ) -> AppResult<Vec<AvailabilityBlock>> {
        validate_blocks(&blocks)?;

        let equipment = self.repository.equipment.get_by_id(equipment_id).await?;
        ensure_owner(claims, &equipment)?;

        let saved = self
            .repository
            .availability
            .replace_all(equipment_id, &blocks)
            .await?;
        tracing::debug!(equipment_id = %equipment_id, blocks = saved.len(), "availability replaced");
        Ok(saved)
    }
}
