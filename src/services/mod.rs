//! Business logic services

pub mod auth;
pub mod availability;
pub mod equipment;
pub mod notifications;
pub mod ratings;
pub mod redis;
pub mod rentals;
pub mod storage;
pub mod users;
pub mod verification;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, StorageConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub equipment: equipment::EquipmentService,
    pub availability: availability::AvailabilityService,
    pub rentals: rentals::RentalsService,
    pub verification: verification::VerificationService,
    pub ratings: ratings::RatingsService,
    pub notifications: notifications::NotificationsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        storage_config: &StorageConfig,
        redis_service: redis::RedisService,
        storage: Arc<dyn storage::DocumentStorage>,
    ) -> Self {
        let notifications = notifications::NotificationsService::new(repository.clone());
        Self {
            auth: auth::AuthService::new(repository.clone(), auth_config, redis_service),
            users: users::UsersService::new(repository.clone(), storage.clone()),
            equipment: equipment::EquipmentService::new(repository.clone()),
            availability: availability::AvailabilityService::new(repository.clone()),
            rentals: rentals::RentalsService::new(repository.clone(), notifications.clone()),
            verification: verification::VerificationService::new(
                repository.clone(),
                storage,
                notifications.clone(),
                storage_config.max_upload_bytes,
            ),
            ratings: ratings::RatingsService::new(repository.clone()),
            notifications,
            repository,
        }
    }
}
