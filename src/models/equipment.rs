//! Equipment model and maintenance history

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::rental_request::DateRange;
use crate::error::{AppError, AppResult};

/// Internal row structure (JSONB columns wrapped in `Json`)
#[derive(Debug, Clone, FromRow)]
pub struct EquipmentRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    description: Option<String>,
    category: String,
    price: Decimal,
    location: Option<String>,
    specifications: Json<BTreeMap<String, String>>,
    is_available: bool,
    is_active: bool,
    is_rented: bool,
    availability_schedule: Json<BTreeMap<String, bool>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EquipmentRow> for Equipment {
    fn from(row: EquipmentRow) -> Self {
        Equipment {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            description: row.description,
            category: row.category,
            price: row.price,
            location: row.location,
            specifications: row.specifications.0,
            is_available: row.is_available,
            is_active: row.is_active,
            is_rented: row.is_rented,
            availability_schedule: row.availability_schedule.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A rentable piece of construction machinery
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Equipment {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    /// Daily rental price
    pub price: Decimal,
    pub location: Option<String>,
    /// Free-form technical specifications (e.g. "weight" → "3.5t")
    pub specifications: BTreeMap<String, String>,
    pub is_available: bool,
    pub is_active: bool,
    pub is_rented: bool,
    /// Per-day availability flags keyed by `YYYY-MM-DD`
    pub availability_schedule: BTreeMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Equipment {
    /// Whether a new rental request may target this equipment
    pub fn is_requestable(&self) -> bool {
        self.is_active && self.is_available
    }

    /// First day of `range` flagged unavailable in the per-day schedule
    pub fn blocked_day_in(&self, range: &DateRange) -> Option<NaiveDate> {
        self.availability_schedule
            .iter()
            .filter(|(_, available)| !**available)
            .filter_map(|(key, _)| schedule_date(key).ok())
            .find(|day| range.start <= *day && *day <= range.end)
    }
}

/// Equipment search parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct EquipmentQuery {
    pub category: Option<String>,
    pub owner_id: Option<Uuid>,
    /// Only active equipment flagged available
    pub available_only: Option<bool>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Search in name and description
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create equipment request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    pub location: Option<String>,
    #[serde(default)]
    pub specifications: BTreeMap<String, String>,
    pub is_available: Option<bool>,
    #[serde(default)]
    #[validate(custom(function = "validate_schedule"))]
    pub availability_schedule: BTreeMap<String, bool>,
}

/// Update equipment request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateEquipment {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Category cannot be empty"))]
    pub category: Option<String>,
    #[validate(custom(function = "validate_price"))]
    pub price: Option<Decimal>,
    pub location: Option<String>,
    pub specifications: Option<BTreeMap<String, String>>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
    #[validate(custom(function = "validate_schedule"))]
    pub availability_schedule: Option<BTreeMap<String, bool>>,
}

/// Upper bound for a daily price or a maintenance cost
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000_000, 0, 0, false, 2);

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let message = if price.is_sign_negative() {
        "Price cannot be negative"
    } else if *price > MAX_PRICE {
        "Price cannot exceed 1000000.00"
    } else {
        return Ok(());
    };
    let mut err = ValidationError::new("price");
    err.message = Some(message.into());
    Err(err)
}

fn validate_schedule(schedule: &BTreeMap<String, bool>) -> Result<(), ValidationError> {
    for key in schedule.keys() {
        if NaiveDate::parse_from_str(key, "%Y-%m-%d").is_err() {
            let mut err = ValidationError::new("availability_schedule");
            err.message = Some(format!("Invalid schedule date '{}' (use YYYY-MM-DD)", key).into());
            return Err(err);
        }
    }
    Ok(())
}

/// Kind of maintenance performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "maintenance_type", rename_all = "lowercase")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaintenanceType {
    Routine,
    Repair,
    Inspection,
    Other,
}

/// Entry of the append-only maintenance history
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MaintenanceRecord {
    pub id: Uuid,
    pub equipment_id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    pub cost: Decimal,
    pub performed_by: String,
    pub maintenance_type: MaintenanceType,
    pub created_at: DateTime<Utc>,
}

/// Add maintenance record request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceRecord {
    /// Date the work was performed (YYYY-MM-DD)
    pub date: NaiveDate,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    pub cost: Decimal,
    #[validate(length(min = 1, message = "Performer is required"))]
    pub performed_by: String,
    pub maintenance_type: MaintenanceType,
}

/// Parse a schedule key, used when checking a rental against per-day flags
pub fn schedule_date(key: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid schedule date '{}'", key)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_schedule_keys_must_be_dates() {
        let mut update = UpdateEquipment::default();
        update.availability_schedule = Some(BTreeMap::from([
            ("2025-06-01".to_string(), true),
            ("tomorrow".to_string(), false),
        ]));
        assert!(update.validate().is_err());

        update.availability_schedule = Some(BTreeMap::from([("2025-06-01".to_string(), true)]));
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_negative_price_rejected() {
        let update = UpdateEquipment {
            price: Some(Decimal::from_str("-10.00").unwrap()),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_price_upper_bound() {
        let at_limit = UpdateEquipment {
            price: Some(MAX_PRICE),
            ..Default::default()
        };
        assert!(at_limit.validate().is_ok());
        assert_eq!(MAX_PRICE.to_string(), "1000000.00");

        let above = UpdateEquipment {
            price: Some(Decimal::from_str("9999999999.99").unwrap()),
            ..Default::default()
        };
        assert!(above.validate().is_err());
    }

    #[test]
    fn test_specifications_deserialize_as_map() {
        let json = r#"{
            "name": "Mini-pelle 3t",
            "category": "excavator",
            "price": "120.50",
            "specifications": {"weight": "3.5t", "fuel": "diesel"}
        }"#;
        let create: CreateEquipment = serde_json::from_str(json).unwrap();
        assert!(create.validate().is_ok());
        assert_eq!(create.specifications.get("fuel").map(String::as_str), Some("diesel"));
        assert!(create.availability_schedule.is_empty());
    }

    #[test]
    fn test_schedule_date_parsing() {
        assert_eq!(
            schedule_date("2025-02-28").unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert!(schedule_date("2025-02-30").is_err());
    }

    #[test]
    fn test_blocked_day_in_range() {
        let now = Utc::now();
        let day = |d| NaiveDate::from_ymd_opt(2025, 7, d).unwrap();
        let equipment = Equipment {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Nacelle 12m".to_string(),
            description: None,
            category: "lift".to_string(),
            price: Decimal::from(90),
            location: None,
            specifications: BTreeMap::new(),
            is_available: true,
            is_active: true,
            is_rented: false,
            availability_schedule: BTreeMap::from([
                ("2025-07-03".to_string(), true),
                ("2025-07-10".to_string(), false),
            ]),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(equipment.blocked_day_in(&DateRange::new(day(1), day(9))), None);
        assert_eq!(equipment.blocked_day_in(&DateRange::new(day(8), day(12))), Some(day(10)));
        assert_eq!(equipment.blocked_day_in(&DateRange::new(day(10), day(10))), Some(day(10)));
    }
}
