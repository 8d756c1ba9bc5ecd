//! Equipment repository (listings and maintenance history)

use sqlx::{types::Json, Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::pagination;
use crate::{
    error::{AppError, AppResult},
    models::equipment::{
        CreateEquipment, CreateMaintenanceRecord, Equipment, EquipmentQuery, EquipmentRow,
        MaintenanceRecord, UpdateEquipment,
    },
};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: Pool<Postgres>,
}

impl EquipmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search equipment with pagination
    pub async fn list(&self, query: &EquipmentQuery) -> AppResult<(Vec<Equipment>, i64)> {
        let (_, per_page, offset) = pagination(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM equipment WHERE TRUE");
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM equipment WHERE TRUE");
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<EquipmentRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows.into_iter().map(Equipment::from).collect(), total))
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &EquipmentQuery) {
        if let Some(ref category) = query.category {
            builder.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(owner_id) = query.owner_id {
            builder.push(" AND owner_id = ").push_bind(owner_id);
        }
        if query.available_only.unwrap_or(false) {
            builder.push(" AND is_active = TRUE AND is_available = TRUE");
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND price >= ").push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(ref search) = query.search {
            let pattern = format!("%{}%", search.to_lowercase());
            builder
                .push(" AND (LOWER(name) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(COALESCE(description, '')) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Get equipment by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>("SELECT * FROM equipment WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Equipment::from)
            .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Create equipment owned by `owner_id`
    pub async fn create(&self, owner_id: Uuid, data: &CreateEquipment) -> AppResult<Equipment> {
        let row = sqlx::query_as::<_, EquipmentRow>(
            r#"
            INSERT INTO equipment (
                id, owner_id, name, description, category, price, location,
                specifications, is_available, availability_schedule
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.price)
        .bind(&data.location)
        .bind(Json(&data.specifications))
        .bind(data.is_available.unwrap_or(true))
        .bind(Json(&data.availability_schedule))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    /// Update equipment; absent fields are left unchanged
    pub async fn update(&self, id: Uuid, data: &UpdateEquipment) -> AppResult<Equipment> {
        sqlx::query_as::<_, EquipmentRow>(
            r#"
            UPDATE equipment SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                price = COALESCE($5, price),
                location = COALESCE($6, location),
                specifications = COALESCE($7, specifications),
                is_available = COALESCE($8, is_available),
                is_active = COALESCE($9, is_active),
                availability_schedule = COALESCE($10, availability_schedule),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&data.name)
        .bind(&data.description)
        .bind(&data.category)
        .bind(data.price)
        .bind(&data.location)
        .bind(data.specifications.as_ref().map(Json))
        .bind(data.is_available)
        .bind(data.is_active)
        .bind(data.availability_schedule.as_ref().map(Json))
        .fetch_optional(&self.pool)
        .await?
        .map(Equipment::from)
        .ok_or_else(|| AppError::NotFound(format!("Equipment {} not found", id)))
    }

    /// Delete equipment (availability, maintenance and requests cascade)
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM equipment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Equipment {} not found", id)));
        }
        Ok(())
    }

    /// Append a maintenance record
    pub async fn add_maintenance(
        &self,
        equipment_id: Uuid,
        data: &CreateMaintenanceRecord,
    ) -> AppResult<MaintenanceRecord> {
        let record = sqlx::query_as::<_, MaintenanceRecord>(
            r#"
            INSERT INTO maintenance_records (id, equipment_id, date, description, cost, performed_by, maintenance_type)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(equipment_id)
        .bind(data.date)
        .bind(&data.description)
        .bind(data.cost)
        .bind(&data.performed_by)
        .bind(data.maintenance_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(record)
    }

    /// Maintenance history, oldest first
    pub async fn list_maintenance(&self, equipment_id: Uuid) -> AppResult<Vec<MaintenanceRecord>> {
        let records = sqlx::query_as::<_, MaintenanceRecord>(
            "SELECT * FROM maintenance_records WHERE equipment_id = $1 ORDER BY date, created_at",
        )
        .bind(equipment_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }
}
