//! Rental request workflow

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, KIND_RENTAL_REQUESTED, KIND_RENTAL_STATUS},
        rental_request::{CreateRentalRequest, Party, RentalRequest, RentalRequestDetails, RentalStatus},
        user::UserClaims,
    },
    repository::Repository,
};

use super::{equipment::ensure_owner, notifications::NotificationsService};

#[derive(Clone)]
pub struct RentalsService {
    repository: Repository,
    notifications: NotificationsService,
}

impl RentalsService {
    pub fn new(repository: Repository, notifications: NotificationsService) -> Self {
        Self { repository, notifications }
    }

    /// Submit a PENDING request and notify the equipment owner
    pub async fn create(&self, claims: &UserClaims, data: CreateRentalRequest) -> AppResult<RentalRequest> {
        data.validate()?;

        let (request, equipment) = self
            .repository
            .rental_requests
            .create(claims.user_id(), &data)
            .await?;

        tracing::info!(
            request_id = %request.id,
            equipment_id = %equipment.id,
            renter = %request.user_id,
            "rental requested"
        );

        self.notifications
            .notify(NewNotification {
                user_id: request.equipment_owner_id,
                kind: KIND_RENTAL_REQUESTED,
                title: format!("New rental request for {}", equipment.name),
                body: format!(
                    "{} requested {} from {} to {}",
                    claims.email, equipment.name, request.start_date, request.end_date
                ),
                related_request_id: Some(request.id),
            })
            .await;

        Ok(request)
    }

    /// Get a request visible to one of its parties
    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<RentalRequest> {
        let request = self.repository.rental_requests.get_by_id(id).await?;
        if request.party_of(claims.user_id(), claims.is_admin()).is_none() {
            return Err(AppError::Authorization(
                "You are not a party to this rental request".to_string(),
            ));
        }
        Ok(request)
    }

    /// Requests the user submitted
    pub async fn list_sent(&self, user_id: Uuid) -> AppResult<Vec<RentalRequestDetails>> {
        self.repository.rental_requests.list_for_user(user_id).await
    }

    /// Requests targeting the user's equipment
    pub async fn list_received(&self, owner_id: Uuid) -> AppResult<Vec<RentalRequestDetails>> {
        self.repository.rental_requests.list_for_owner(owner_id).await
    }

    pub async fn list_for_equipment(
        &self,
        claims: &UserClaims,
        equipment_id: Uuid,
    ) -> AppResult<Vec<RentalRequestDetails>> {
        let equipment = self.repository.equipment.get_by_id(equipment_id).await?;
        ensure_owner(claims, &equipment)?;
        self.repository
            .rental_requests
            .list_for_equipment(equipment_id)
            .await
    }

    /// Apply a workflow transition and notify the other party
    pub async fn update_status(
        &self,
        claims: &UserClaims,
        id: Uuid,
        next: RentalStatus,
    ) -> AppResult<RentalRequest> {
        let request = self.repository.rental_requests.get_by_id(id).await?;
        let party = request
            .party_of(claims.user_id(), claims.is_admin())
            .ok_or_else(|| {
                AppError::Authorization("You are not a party to this rental request".to_string())
            })?;

        let next = request.status.transition(next, party)?;
        let updated = self
            .repository
            .rental_requests
            .update_status(id, request.status, next)
            .await?;

        tracing::info!(
            request_id = %id,
            from = %request.status,
            to = %next,
            actor = %claims.user_id(),
            "rental status changed"
        );

        for recipient in status_recipients(&updated, party) {
            self.notifications
                .notify(NewNotification {
                    user_id: recipient,
                    kind: KIND_RENTAL_STATUS,
                    title: format!("Rental request {}", next.as_str().to_lowercase()),
                    body: format!(
                        "Rental from {} to {} is now {}",
                        updated.start_date, updated.end_date, next
                    ),
                    related_request_id: Some(updated.id),
                })
                .await;
        }

        Ok(updated)
    }

    /// Withdraw a request: the renter while it is PENDING, an admin at any time
    pub async fn delete(&self, claims: &UserClaims, id: Uuid) -> AppResult<()> {
        let request = self.repository.rental_requests.get_by_id(id).await?;
        let allowed = claims.is_admin()
            || (request.user_id == claims.user_id() && request.status == RentalStatus::Pending);
        if !allowed {
            return Err(AppError::Authorization(
                "Only a pending request can be withdrawn by its requester".to_string(),
            ));
        }
        self.repository.rental_requests.delete(id).await
    }
}

/// Who hears about a status change made by `party`
fn status_recipients(request: &RentalRequest, party: Party) -> Vec<Uuid> {
    match party {
        Party::Renter => vec![request.equipment_owner_id],
        Party::Owner => vec![request.user_id],
        Party::Admin => vec![request.user_id, request.equipment_owner_id],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn rental() -> RentalRequest {
        let day = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        RentalRequest {
            id: Uuid::new_v4(),
            equipment_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            equipment_owner_id: Uuid::new_v4(),
            start_date: day,
            end_date: day,
            status: RentalStatus::Approved,
            message: None,
            total_price: Decimal::ZERO,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_recipients() {
        let r = rental();
        assert_eq!(status_recipients(&r, Party::Renter), vec![r.equipment_owner_id]);
        assert_eq!(status_recipients(&r, Party::Owner), vec![r.user_id]);
        assert_eq!(
            status_recipients(&r, Party::Admin),
            vec![r.user_id, r.equipment_owner_id]
        );
    }
}
