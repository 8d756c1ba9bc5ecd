//! User administration and account deletion

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::user::{DeletionSummary, Role, UpdateUserStatus, User, UserQuery, UserShort},
    repository::Repository,
};

use super::storage::DocumentStorage;

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    storage: Arc<dyn DocumentStorage>,
}

impl UsersService {
    pub fn new(repository: Repository, storage: Arc<dyn DocumentStorage>) -> Self {
        Self { repository, storage }
    }

    /// Search users
    pub async fn search_users(&self, query: &UserQuery) -> AppResult<(Vec<UserShort>, i64)> {
        self.repository.users.search(query).await
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn update_role(&self, id: Uuid, role: Role, actor_id: Uuid) -> AppResult<User> {
        if id == actor_id && role != Role::Admin {
            return Err(AppError::BusinessRule(
                "Administrators cannot remove their own admin role".to_string(),
            ));
        }
        let user = self.repository.users.update_role(id, role).await?;
        tracing::info!(user_id = %id, role = %role, actor = %actor_id, "user role changed");
        Ok(user)
    }

    /// Change activation or verification status; verification changes are audited
    pub async fn update_status(&self, id: Uuid, data: UpdateUserStatus, actor_id: Uuid) -> AppResult<User> {
        let user = self.repository.users.update_status(id, &data, actor_id).await?;
        tracing::info!(
            user_id = %id,
            is_active = ?data.is_active,
            verification_status = ?data.verification_status,
            actor = %actor_id,
            "user status changed"
        );
        Ok(user)
    }

    /// Delete the account and all data keyed by it.
    ///
    /// Stored document files are removed after the transaction commits; a
    /// failure there is logged and does not undo the deletion.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<DeletionSummary> {
        let (summary, storage_keys) = self.repository.users.delete_cascade(id).await?;

        for key in &storage_keys {
            if let Err(e) = self.storage.delete(key).await {
                tracing::warn!(user_id = %id, key = %key, "failed to remove stored document: {}", e);
            }
        }

        tracing::info!(
            user_id = %id,
            rental_requests = summary.rental_requests,
            equipment = summary.equipment,
            notifications = summary.notifications,
            ratings = summary.ratings,
            verification_documents = summary.verification_documents,
            "user deleted"
        );
        Ok(summary)
    }
}
