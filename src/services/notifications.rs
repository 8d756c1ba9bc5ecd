//! In-app notifications

use uuid::Uuid;

use crate::{
    error::AppResult,
    models::notification::{NewNotification, Notification},
    repository::Repository,
};

#[derive(Clone)]
pub struct NotificationsService {
    repository: Repository,
}

impl NotificationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Store a notification; failures are logged, never returned
    pub async fn notify(&self, notification: NewNotification) {
        if let Err(e) = self.repository.notifications.create(&notification).await {
            tracing::warn!(
                user_id = %notification.user_id,
                kind = notification.kind,
                "failed to store notification: {}",
                e
            );
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid, unread_only: bool) -> AppResult<Vec<Notification>> {
        self.repository
            .notifications
            .list_for_user(user_id, unread_only)
            .await
    }

    pub async fn mark_read(&self, user_id: Uuid, id: Uuid) -> AppResult<Notification> {
        self.repository.notifications.mark_read(id, user_id).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> AppResult<u64> {
        self.repository.notifications.mark_all_read(user_id).await
    }
}
