//! Rental request model and workflow rules

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Build a range, rejecting `start > end`
    pub fn checked(start: NaiveDate, end: NaiveDate) -> AppResult<Self> {
        if start > end {
            return Err(AppError::Validation(format!(
                "Start date {} must not be after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Both ends are inclusive: ranges sharing a single day overlap
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Rental request lifecycle
///
/// ```text
/// PENDING ──► APPROVED ──► ACTIVE ──► COMPLETED
///    │           │
///    └──► REJECTED ◄┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rental_status", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RentalStatus {
    Pending,
    Approved,
    Rejected,
    Active,
    Completed,
}

/// Party performing a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Owner,
    Renter,
    Admin,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "PENDING",
            RentalStatus::Approved => "APPROVED",
            RentalStatus::Rejected => "REJECTED",
            RentalStatus::Active => "ACTIVE",
            RentalStatus::Completed => "COMPLETED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Rejected | RentalStatus::Completed)
    }

    /// Statuses that reserve the equipment for their date range
    pub fn blocks_calendar(&self) -> bool {
        matches!(
            self,
            RentalStatus::Pending | RentalStatus::Approved | RentalStatus::Active
        )
    }

    pub fn can_transition_to(&self, next: RentalStatus) -> bool {
        use RentalStatus::*;
        matches!(
            (*self, next),
            (Pending, Approved) | (Pending, Rejected) | (Approved, Active) | (Approved, Rejected) | (Active, Completed)
        )
    }

    /// Validate a transition requested by `party`
    pub fn transition(&self, next: RentalStatus, party: Party) -> AppResult<RentalStatus> {
        if self.is_terminal() {
            return Err(AppError::InvalidTransition(format!(
                "A {} request can no longer change status",
                self
            )));
        }
        if !self.can_transition_to(next) {
            return Err(AppError::InvalidTransition(format!(
                "Cannot move a {} request to {}",
                self, next
            )));
        }
        if party == Party::Renter && next != RentalStatus::Completed {
            return Err(AppError::Authorization(format!(
                "Only the equipment owner can set a request to {}",
                next
            )));
        }
        Ok(next)
    }
}

impl std::fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Rental request from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalRequest {
    pub id: Uuid,
    pub equipment_id: Uuid,
    /// Requesting client
    pub user_id: Uuid,
    pub equipment_owner_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: RentalStatus,
    pub message: Option<String>,
    pub total_price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentalRequest {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    /// Which party `user_id` is on this request, if any
    pub fn party_of(&self, user_id: Uuid, is_admin: bool) -> Option<Party> {
        if is_admin {
            Some(Party::Admin)
        } else if user_id == self.equipment_owner_id {
            Some(Party::Owner)
        } else if user_id == self.user_id {
            Some(Party::Renter)
        } else {
            None
        }
    }
}

/// Rental request joined with equipment name for listings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RentalRequestDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub request: RentalRequest,
    pub equipment_name: String,
}

/// Create rental request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRentalRequest {
    pub equipment_id: Uuid,
    /// First rental day (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Last rental day, inclusive (YYYY-MM-DD)
    pub end_date: NaiveDate,
    #[validate(length(max = 2000, message = "Message is too long"))]
    pub message: Option<String>,
}

/// Status change request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRentalStatus {
    pub status: RentalStatus,
}

/// First request in `existing` on the same equipment that still reserves the
/// calendar and overlaps `range`.
pub fn find_overlap<'a>(
    existing: &'a [RentalRequest],
    equipment_id: Uuid,
    range: &DateRange,
) -> Option<&'a RentalRequest> {
    existing
        .iter()
        .filter(|r| r.equipment_id == equipment_id && r.status.blocks_calendar())
        .find(|r| r.range().overlaps(range))
}

/// Total price for `range` at a daily `price`
pub fn total_price(price: Decimal, range: &DateRange) -> Decimal {
    price * Decimal::from(range.days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn request(equipment_id: Uuid, start: &str, end: &str, status: RentalStatus) -> RentalRequest {
        let now = Utc::now();
        RentalRequest {
            id: Uuid::new_v4(),
            equipment_id,
            user_id: Uuid::new_v4(),
            equipment_owner_id: Uuid::new_v4(),
            start_date: date(start),
            end_date: date(end),
            status,
            message: None,
            total_price: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_inclusive_overlap() {
        let a = DateRange::new(date("2025-03-01"), date("2025-03-05"));
        let touching = DateRange::new(date("2025-03-05"), date("2025-03-08"));
        let after = DateRange::new(date("2025-03-06"), date("2025-03-08"));
        let inside = DateRange::new(date("2025-03-02"), date("2025-03-03"));
        assert!(a.overlaps(&touching));
        assert!(touching.overlaps(&a));
        assert!(!a.overlaps(&after));
        assert!(a.overlaps(&inside));
        assert!(inside.overlaps(&a));
    }

    #[test]
    fn test_checked_range() {
        assert!(DateRange::checked(date("2025-03-02"), date("2025-03-01")).is_err());
        let single = DateRange::checked(date("2025-03-02"), date("2025-03-02")).unwrap();
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_find_overlap_only_blocking_statuses_on_same_equipment() {
        let excavator = Uuid::new_v4();
        let crane = Uuid::new_v4();
        let existing = vec![
            request(excavator, "2025-04-01", "2025-04-10", RentalStatus::Rejected),
            request(excavator, "2025-04-01", "2025-04-10", RentalStatus::Completed),
            request(crane, "2025-04-01", "2025-04-10", RentalStatus::Approved),
        ];
        let wanted = DateRange::new(date("2025-04-05"), date("2025-04-06"));
        assert!(find_overlap(&existing, excavator, &wanted).is_none());

        let mut existing = existing;
        existing.push(request(excavator, "2025-04-06", "2025-04-08", RentalStatus::Pending));
        let hit = find_overlap(&existing, excavator, &wanted).unwrap();
        assert_eq!(hit.status, RentalStatus::Pending);
    }

    #[test]
    fn test_allowed_transitions() {
        use RentalStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Approved.can_transition_to(Active));
        assert!(Approved.can_transition_to(Rejected));
        assert!(Active.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Active));
        assert!(!Active.can_transition_to(Rejected));
        assert!(!Pending.can_transition_to(Pending));
    }

    #[test]
    fn test_terminal_states_never_regress() {
        use RentalStatus::*;
        assert!(Completed.is_terminal() && Rejected.is_terminal());
        assert!(!Active.is_terminal());
        for next in [Pending, Approved, Rejected, Active, Completed] {
            assert!(!Completed.can_transition_to(next));
            assert!(!Rejected.can_transition_to(next));
            assert!(matches!(
                Rejected.transition(next, Party::Admin),
                Err(AppError::InvalidTransition(_))
            ));
        }
        assert!(matches!(
            Completed.transition(Pending, Party::Admin),
            Err(AppError::InvalidTransition(_))
        ));
    }

    #[test]
    fn test_renter_may_only_complete() {
        use RentalStatus::*;
        assert!(matches!(
            Pending.transition(Approved, Party::Renter),
            Err(AppError::Authorization(_))
        ));
        assert_eq!(Active.transition(Completed, Party::Renter).unwrap(), Completed);
        assert_eq!(Pending.transition(Approved, Party::Owner).unwrap(), Approved);
    }

    #[test]
    fn test_party_resolution() {
        let r = request(Uuid::new_v4(), "2025-04-01", "2025-04-02", RentalStatus::Pending);
        assert_eq!(r.party_of(r.equipment_owner_id, false), Some(Party::Owner));
        assert_eq!(r.party_of(r.user_id, false), Some(Party::Renter));
        assert_eq!(r.party_of(Uuid::new_v4(), false), None);
        assert_eq!(r.party_of(Uuid::new_v4(), true), Some(Party::Admin));
    }

    #[test]
    fn test_total_price_counts_both_ends() {
        let range = DateRange::new(date("2025-04-01"), date("2025-04-03"));
        let price: Decimal = "150.25".parse().unwrap();
        assert_eq!(total_price(price, &range), "450.75".parse::<Decimal>().unwrap());
    }

    #[test]
    fn test_status_json() {
        assert_eq!(serde_json::to_string(&RentalStatus::Completed).unwrap(), "\"COMPLETED\"");
        let parsed: UpdateRentalStatus = serde_json::from_str(r#"{"status":"APPROVED"}"#).unwrap();
        assert_eq!(parsed.status, RentalStatus::Approved);
    }
}
