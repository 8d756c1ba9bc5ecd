//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{pagination, verification::VerificationRepository};
use crate::{
    error::{AppError, AppResult},
    models::user::{
        DeletionSummary, RegisterUser, Role, UpdateProfile, UpdateUserStatus, User, UserQuery,
        UserShort,
    },
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (case-insensitive)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Check if email already exists
    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Insert a new user profile
    pub async fn create(&self, data: &RegisterUser, role: Role, password_hash: &str) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role, first_name, last_name, phone, company_name)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.email.trim())
        .bind(password_hash)
        .bind(role)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone)
        .bind(&data.company_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::from_db(e, "Email already registered"))
    }

    /// Search users with pagination
    pub async fn search(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        let (_, per_page, offset) = pagination(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        Self::push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(
            "SELECT id, email, first_name, last_name, role, is_active, verification_status FROM users WHERE TRUE",
        );
        Self::push_filters(&mut select, query);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let users = select
            .build_query_as::<UserShort>()
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &UserQuery) {
        if let Some(ref name) = query.name {
            let pattern = format!("%{}%", name.to_lowercase());
            builder
                .push(" AND (LOWER(email) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(first_name) LIKE ")
                .push_bind(pattern.clone())
                .push(" OR LOWER(last_name) LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(role) = query.role {
            builder.push(" AND role = ").push_bind(role);
        }
        if let Some(is_active) = query.is_active {
            builder.push(" AND is_active = ").push_bind(is_active);
        }
    }

    /// Update own profile fields
    pub async fn update_profile(
        &self,
        id: Uuid,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone = COALESCE($4, phone),
                company_name = COALESCE($5, company_name),
                password_hash = COALESCE($6, password_hash),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.phone)
        .bind(&profile.company_name)
        .bind(password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Change a user's role
    pub async fn update_role(&self, id: Uuid, role: Role) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(role)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Change activation and/or verification status.
    ///
    /// A verification change is written to the audit trail in the same
    /// transaction.
    pub async fn update_status(
        &self,
        id: Uuid,
        data: &UpdateUserStatus,
        actor_id: Uuid,
    ) -> AppResult<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET
                is_active = COALESCE($2, is_active),
                verification_status = COALESCE($3, verification_status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.is_active)
        .bind(data.verification_status)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        if let Some(status) = data.verification_status {
            VerificationRepository::append_history(
                &mut tx,
                id,
                None,
                "status_changed",
                status,
                Some(actor_id),
                None,
            )
            .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    /// Delete a user and everything keyed by their id, in one transaction.
    ///
    /// Returns the per-table counts and the storage keys of the removed
    /// verification documents; the files themselves are removed by the caller.
    pub async fn delete_cascade(&self, id: Uuid) -> AppResult<(DeletionSummary, Vec<String>)> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))?;

        let mut summary = DeletionSummary::default();

        // Ratings written by the user, or attached to their equipment or requests
        summary.ratings = sqlx::query(
            r#"
            DELETE FROM ratings
            WHERE user_id = $1
               OR equipment_id IN (SELECT id FROM equipment WHERE owner_id = $1)
               OR rental_request_id IN (
                    SELECT id FROM rental_requests WHERE user_id = $1 OR equipment_owner_id = $1
               )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        summary.notifications = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        summary.rental_requests = sqlx::query(
            "DELETE FROM rental_requests WHERE user_id = $1 OR equipment_owner_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        // Availability and maintenance rows follow via ON DELETE CASCADE
        summary.equipment = sqlx::query("DELETE FROM equipment WHERE owner_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM verification_history WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let storage_keys: Vec<String> = sqlx::query_scalar(
            "DELETE FROM verification_documents WHERE user_id = $1 RETURNING storage_key",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        summary.verification_documents = storage_keys.len() as u64;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok((summary, storage_keys))
    }
}
