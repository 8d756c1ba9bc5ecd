//! Availability calendar blocks

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::rental_request::DateRange;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "availability_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Unavailable,
}

/// A date range marked available/unavailable for one equipment item
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AvailabilityBlock {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: AvailabilityStatus,
    /// Order in which the block was saved
    pub position: i32,
}

impl AvailabilityBlock {
    pub fn range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }
}

/// Block as submitted by the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NewAvailabilityBlock {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: AvailabilityStatus,
}

/// Replace-all request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceAvailability {
    pub blocks: Vec<NewAvailabilityBlock>,
}

/// Check date ordering of every block. Overlaps and duplicates are kept as-is.
pub fn validate_blocks(blocks: &[NewAvailabilityBlock]) -> AppResult<()> {
    for (index, block) in blocks.iter().enumerate() {
        if block.start_date > block.end_date {
            return Err(AppError::Validation(format!(
                "Block {}: start date {} is after end date {}",
                index + 1,
                block.start_date,
                block.end_date
            )));
        }
    }
    Ok(())
}

/// First `unavailable` block intersecting the range, if any
pub fn find_unavailable<'a>(
    blocks: &'a [AvailabilityBlock],
    range: &DateRange,
) -> Option<&'a AvailabilityBlock> {
    blocks
        .iter()
        .filter(|b| b.status == AvailabilityStatus::Unavailable)
        .find(|b| b.range().overlaps(range))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn block(start: &str, end: &str, status: AvailabilityStatus) -> NewAvailabilityBlock {
        NewAvailabilityBlock {
            start_date: date(start),
            end_date: date(end),
            status,
        }
    }

    #[test]
    fn test_reversed_block_rejected() {
        let blocks = vec![
            block("2025-05-01", "2025-05-10", AvailabilityStatus::Available),
            block("2025-05-20", "2025-05-12", AvailabilityStatus::Unavailable),
        ];
        match validate_blocks(&blocks) {
            Err(AppError::Validation(msg)) => assert!(msg.starts_with("Block 2")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_and_single_days_accepted() {
        let blocks = vec![
            block("2025-05-01", "2025-05-01", AvailabilityStatus::Available),
            block("2025-05-01", "2025-05-01", AvailabilityStatus::Available),
        ];
        assert!(validate_blocks(&blocks).is_ok());
        assert!(validate_blocks(&[]).is_ok());
    }

    #[test]
    fn test_find_unavailable_ignores_available_blocks() {
        let equipment_id = Uuid::new_v4();
        let saved: Vec<AvailabilityBlock> = [
            ("2025-07-01", "2025-07-31", AvailabilityStatus::Available),
            ("2025-07-14", "2025-07-15", AvailabilityStatus::Unavailable),
        ]
        .iter()
        .enumerate()
        .map(|(i, (s, e, status))| AvailabilityBlock {
            id: Uuid::new_v4(),
            equipment_id,
            start_date: date(s),
            end_date: date(e),
            status: *status,
            position: i as i32,
        })
        .collect();

        let early = DateRange::new(date("2025-07-02"), date("2025-07-05"));
        assert!(find_unavailable(&saved, &early).is_none());

        let holiday = DateRange::new(date("2025-07-10"), date("2025-07-14"));
        assert_eq!(find_unavailable(&saved, &holiday).map(|b| b.position), Some(1));
    }
}
