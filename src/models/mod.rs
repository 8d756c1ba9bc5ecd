//! Data models for Equirent

pub mod availability;
pub mod equipment;
pub mod notification;
pub mod rating;
pub mod rental_request;
pub mod user;
pub mod verification;

// Re-export commonly used types
pub use availability::{AvailabilityBlock, AvailabilityStatus, NewAvailabilityBlock};
pub use equipment::{Equipment, MaintenanceRecord, MaintenanceType};
pub use notification::Notification;
pub use rating::{Rating, RatingSummary};
pub use rental_request::{DateRange, RentalRequest, RentalStatus};
pub use user::{Role, User, UserClaims, UserShort, VerificationStatus};
pub use verification::{DocumentStatus, DocumentType, VerificationDocument};
