//! Availability calendar endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::availability::{AvailabilityBlock, ReplaceAvailability},
};

use super::AuthenticatedUser;

/// Availability blocks of an equipment item, in saved order
#[utoipa::path(
    get,
    path = "/equipment/{id}/availability",
    tag = "availability",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Availability blocks", body = Vec<AvailabilityBlock>),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn get_availability(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<AvailabilityBlock>>> {
    let blocks = state.services.availability.get(id).await?;
    Ok(Json(blocks))
}

/// Replace the whole calendar (owner or admin)
#[utoipa::path(
    put,
    path = "/equipment/{id}/availability",
    tag = "availability",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body = ReplaceAvailability,
    responses(
        (status = 200, description = "Calendar replaced", body = Vec<AvailabilityBlock>),
        (status = 400, description = "A block ends before it starts"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn replace_availability(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<ReplaceAvailability>,
) -> AppResult<Json<Vec<AvailabilityBlock>>> {
    let blocks = state
        .services
        .availability
        .replace_all(&claims, id, data.blocks)
        .await?;
    Ok(Json(blocks))
}
