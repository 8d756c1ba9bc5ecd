//! Equipment listings and maintenance history

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        equipment::{
            CreateEquipment, CreateMaintenanceRecord, Equipment, EquipmentQuery, MaintenanceRecord,
            UpdateEquipment,
        },
        user::UserClaims,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct EquipmentService {
    repository: Repository,
}

impl EquipmentService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<Equipment>, i64)> {
        self.repository.equipment.list(query).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        self.repository.equipment.get_by_id(id).await
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateEquipment) -> AppResult<Equipment> {
        claims.require_equipment_lister()?;
        data.validate()?;

        let equipment = self.repository.equipment.create(claims.user_id(), &data).await?;
        tracing::info!(equipment_id = %equipment.id, owner_id = %equipment.owner_id, "equipment listed");
        Ok(equipment)
    }

    pub async fn update(&self, claims: &UserClaims, id: Uuid, data: UpdateEquipment) -> AppResult<Equipment> {
        data.validate()?;
        self.owned(claims, id).await?;
        self.repository.equipment.update(id, &data).await
    }

    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        self.owned(claims, id).await?;
        self.repository.equipment.delete(id).await?;
        tracing::info!(equipment_id = %id, actor = %claims.user_id(), "equipment deleted");
        Ok(())
    }

    pub async fn add_maintenance(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: CreateMaintenanceRecord,
    ) -> AppResult<MaintenanceRecord> {
        data.validate()?;
        self.owned(claims, id).await?;
        self.repository.equipment.add_maintenance(id, &data).await
    }

    pub async fn list_maintenance(&self, id: Uuid) -> AppResult<Vec<MaintenanceRecord>> {
        self.repository.equipment.get_by_id(id).await?;
        self.repository.equipment.list_maintenance(id).await
    }

    /// Load equipment the caller owns (or any equipment for an admin)
    pub async fn owned(&self, claims: &UserClaims, id: Uuid) -> AppResult<Equipment> {
        let equipment = self.repository.equipment.get_by_id(id).await?;
        ensure_owner(claims, &equipment)?;
        Ok(equipment)
    }
}

pub(crate) fn ensure_owner(claims: &UserClaims, equipment: &Equipment) -> AppResult<()> {
    if equipment.owner_id == claims.user_id() || claims.is_admin() {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only the owner can modify this equipment".to_string(),
        ))
    }
}
