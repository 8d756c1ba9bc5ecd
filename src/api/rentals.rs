//! Rental request endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::rental_request::{CreateRentalRequest, RentalRequest, RentalRequestDetails, UpdateRentalStatus},
};

use super::AuthenticatedUser;

/// Which side of the rental to list
#[derive(Debug, Default, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RentalRole {
    /// Requests the caller submitted
    #[default]
    Renter,
    /// Requests for the caller's equipment
    Owner,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RentalListQuery {
    pub role: Option<RentalRole>,
}

/// Submit a rental request
#[utoipa::path(
    post,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    request_body = CreateRentalRequest,
    responses(
        (status = 201, description = "Request submitted", body = RentalRequest),
        (status = 400, description = "Invalid dates"),
        (status = 404, description = "Equipment not found"),
        (status = 409, description = "Dates overlap an existing request"),
        (status = 422, description = "Equipment unavailable")
    )
)]
pub async fn create_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateRentalRequest>,
) -> AppResult<(StatusCode, Json<RentalRequest>)> {
    let request = state.services.rentals.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

/// List the caller's rental requests
#[utoipa::path(
    get,
    path = "/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(RentalListQuery),
    responses(
        (status = 200, description = "Rental requests", body = Vec<RentalRequestDetails>)
    )
)]
pub async fn list_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<RentalListQuery>,
) -> AppResult<Json<Vec<RentalRequestDetails>>> {
    let requests = match query.role.unwrap_or_default() {
        RentalRole::Renter => state.services.rentals.list_sent(claims.user_id()).await?,
        RentalRole::Owner => state.services.rentals.list_received(claims.user_id()).await?,
    };
    Ok(Json(requests))
}

/// Get a rental request (either party or admin)
#[utoipa::path(
    get,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Rental request ID")
    ),
    responses(
        (status = 200, description = "Rental request", body = RentalRequest),
        (status = 403, description = "Not a party to this request"),
        (status = 404, description = "Rental request not found")
    )
)]
pub async fn get_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RentalRequest>> {
    let request = state.services.rentals.get(&claims, id).await?;
    Ok(Json(request))
}

/// Move a request through its workflow
#[utoipa::path(
    put,
    path = "/rentals/{id}/status",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Rental request ID")
    ),
    request_body = UpdateRentalStatus,
    responses(
        (status = 200, description = "Status updated", body = RentalRequest),
        (status = 403, description = "Party not allowed to make this change"),
        (status = 404, description = "Rental request not found"),
        (status = 409, description = "Request changed concurrently"),
        (status = 422, description = "Transition not allowed")
    )
)]
pub async fn update_rental_status(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateRentalStatus>,
) -> AppResult<Json<RentalRequest>> {
    let request = state
        .services
        .rentals
        .update_status(&claims, id, data.status)
        .await?;
    Ok(Json(request))
}

/// Withdraw a pending request (requester) or remove any request (admin)
#[utoipa::path(
    delete,
    path = "/rentals/{id}",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Rental request ID")
    ),
    responses(
        (status = 204, description = "Request deleted"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Rental request not found")
    )
)]
pub async fn delete_rental(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.rentals.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Requests targeting an equipment item (owner or admin)
#[utoipa::path(
    get,
    path = "/equipment/{id}/rentals",
    tag = "rentals",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Rental requests", body = Vec<RentalRequestDetails>),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn list_equipment_rentals(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<RentalRequestDetails>>> {
    let requests = state
        .services
        .rentals
        .list_for_equipment(&claims, id)
        .await?;
    Ok(Json(requests))
}
