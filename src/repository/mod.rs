//! Repository layer for database operations

pub mod availability;
pub mod equipment;
pub mod notifications;
pub mod ratings;
pub mod rental_requests;
pub mod users;
pub mod verification;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub equipment: equipment::EquipmentRepository,
    pub availability: availability::AvailabilityRepository,
    pub rental_requests: rental_requests::RentalRequestsRepository,
    pub verification: verification::VerificationRepository,
    pub ratings: ratings::RatingsRepository,
    pub notifications: notifications::NotificationsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            equipment: equipment::EquipmentRepository::new(pool.clone()),
            availability: availability::AvailabilityRepository::new(pool.clone()),
            rental_requests: rental_requests::RentalRequestsRepository::new(pool.clone()),
            verification: verification::VerificationRepository::new(pool.clone()),
            ratings: ratings::RatingsRepository::new(pool.clone()),
            notifications: notifications::NotificationsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Normalize page/per_page query values into (page, per_page, offset)
pub(crate) fn pagination(page: Option<i64>, per_page: Option<i64>) -> (i64, i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page, (page - 1) * per_page)
}

#[cfg(test)]
mod tests {
    use super::pagination;

    #[test]
    fn test_pagination_bounds() {
        assert_eq!(pagination(None, None), (1, 20, 0));
        assert_eq!(pagination(Some(3), Some(10)), (3, 10, 20));
        assert_eq!(pagination(Some(0), Some(1000)), (1, 100, 0));
    }
}
