//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    auth, availability, equipment, health, notifications, ratings, rentals, users, verification,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Equirent API",
        version = "1.0.0",
        description = "Construction equipment rental marketplace REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html"),
        contact(name = "Equirent Team", email = "dev@equirent.fr")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::logout,
        auth::me,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::delete_user,
        users::update_role,
        users::update_status,
        // Equipment
        equipment::list_equipment,
        equipment::get_equipment,
        equipment::create_equipment,
        equipment::update_equipment,
        equipment::delete_equipment,
        equipment::list_maintenance,
        equipment::add_maintenance,
        // Availability
        availability::get_availability,
        availability::replace_availability,
        // Rentals
        rentals::create_rental,
        rentals::list_rentals,
        rentals::get_rental,
        rentals::update_rental_status,
        rentals::delete_rental,
        rentals::list_equipment_rentals,
        // Verification
        verification::upload_document,
        verification::list_documents,
        verification::download_document,
        verification::review_document,
        verification::verification_history,
        // Ratings
        ratings::list_ratings,
        ratings::rating_summary,
        ratings::create_rating,
        // Notifications
        notifications::list_notifications,
        notifications::mark_read,
        notifications::mark_all_read,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::AuthResponse,
            // Users
            crate::models::user::User,
            crate::models::user::UserShort,
            crate::models::user::Role,
            crate::models::user::VerificationStatus,
            crate::models::user::RegisterUser,
            crate::models::user::UpdateProfile,
            crate::models::user::UpdateRole,
            crate::models::user::UpdateUserStatus,
            crate::models::user::DeletionSummary,
            // Equipment
            crate::models::equipment::Equipment,
            crate::models::equipment::CreateEquipment,
            crate::models::equipment::UpdateEquipment,
            crate::models::equipment::MaintenanceRecord,
            crate::models::equipment::MaintenanceType,
            crate::models::equipment::CreateMaintenanceRecord,
            // Availability
            crate::models::availability::AvailabilityBlock,
            crate::models::availability::AvailabilityStatus,
            crate::models::availability::NewAvailabilityBlock,
            crate::models::availability::ReplaceAvailability,
            // Rentals
            crate::models::rental_request::RentalRequest,
            crate::models::rental_request::RentalRequestDetails,
            crate::models::rental_request::RentalStatus,
            crate::models::rental_request::CreateRentalRequest,
            crate::models::rental_request::UpdateRentalStatus,
            rentals::RentalRole,
            // Verification
            crate::models::verification::VerificationDocument,
            crate::models::verification::DocumentType,
            crate::models::verification::DocumentStatus,
            crate::models::verification::ReviewDocument,
            crate::models::verification::VerificationHistoryEntry,
            verification::UploadForm,
            // Ratings
            crate::models::rating::Rating,
            crate::models::rating::CreateRating,
            crate::models::rating::RatingSummary,
            // Notifications
            crate::models::notification::Notification,
            notifications::MarkAllReadResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "equipment", description = "Equipment listings and maintenance"),
        (name = "availability", description = "Availability calendars"),
        (name = "rentals", description = "Rental request workflow"),
        (name = "verification", description = "Account verification documents"),
        (name = "ratings", description = "Equipment ratings"),
        (name = "notifications", description = "In-app notifications")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
