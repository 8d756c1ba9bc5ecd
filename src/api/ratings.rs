//! Equipment rating endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::rating::{CreateRating, Rating, RatingSummary},
};

use super::AuthenticatedUser;

/// Ratings of an equipment item, newest first
#[utoipa::path(
    get,
    path = "/equipment/{id}/ratings",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Ratings", body = Vec<Rating>),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn list_ratings(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Rating>>> {
    let ratings = state.services.ratings.list_for_equipment(id).await?;
    Ok(Json(ratings))
}

/// Average score and rating count
#[utoipa::path(
    get,
    path = "/equipment/{id}/ratings/summary",
    tag = "ratings",
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    responses(
        (status = 200, description = "Rating summary", body = RatingSummary),
        (status = 404, description = "Equipment not found")
    )
)]
pub async fn rating_summary(
    State(state): State<crate::AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<RatingSummary>> {
    let summary = state.services.ratings.summary(id).await?;
    Ok(Json(summary))
}

/// Rate equipment after a completed rental
#[utoipa::path(
    post,
    path = "/equipment/{id}/ratings",
    tag = "ratings",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Equipment ID")
    ),
    request_body = CreateRating,
    responses(
        (status = 201, description = "Rating stored", body = Rating),
        (status = 400, description = "Invalid score"),
        (status = 403, description = "Not the renter"),
        (status = 409, description = "Rental already rated"),
        (status = 422, description = "Rental not completed")
    )
)]
pub async fn create_rating(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<CreateRating>,
) -> AppResult<(StatusCode, Json<Rating>)> {
    let rating = state
        .services
        .ratings
        .create(claims.user_id(), id, data)
        .await?;
    Ok((StatusCode::CREATED, Json(rating)))
}
