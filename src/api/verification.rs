//! Verification document endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::Multipart;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::verification::{DocumentType, ReviewDocument, VerificationDocument, VerificationHistoryEntry},
    services::verification::Upload,
};

use super::AuthenticatedUser;

/// Multipart form of a document upload
#[derive(utoipa::ToSchema)]
pub struct UploadForm {
    /// IDENTITY, BUSINESS_REGISTRATION, INSURANCE or OTHER
    pub document_type: String,
    /// PDF, JPEG or PNG file
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Upload a verification document for the caller's account
#[utoipa::path(
    post,
    path = "/verification/documents",
    tag = "verification",
    security(("bearer_auth" = [])),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = VerificationDocument),
        (status = 400, description = "Missing field, unsupported type or file too large")
    )
)]
pub async fn upload_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<VerificationDocument>)> {
    let mut document_type: Option<DocumentType> = None;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("document_type") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid document_type field: {}", e)))?;
                document_type = Some(text.trim().parse::<DocumentType>().map_err(AppError::Validation)?);
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid file field: {}", e)))?;
                file = Some((file_name, content_type, data.to_vec()));
            }
            _ => {}
        }
    }

    let document_type = document_type
        .ok_or_else(|| AppError::Validation("Field 'document_type' is required".to_string()))?;
    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::Validation("Field 'file' is required".to_string()))?;

    let document = state
        .services
        .verification
        .upload(
            claims.user_id(),
            Upload {
                document_type,
                file_name,
                content_type,
                data,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Documents uploaded by a user (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/verification/documents",
    tag = "verification",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Documents", body = Vec<VerificationDocument>),
        (status = 403, description = "Not your account")
    )
)]
pub async fn list_documents(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<VerificationDocument>>> {
    let documents = state
        .services
        .verification
        .list_for_user(&claims, user_id)
        .await?;
    Ok(Json(documents))
}

/// Download a document's content (owner or admin)
#[utoipa::path(
    get,
    path = "/verification/documents/{id}/content",
    tag = "verification",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Not your document"),
        (status = 404, description = "Document not found")
    )
)]
pub async fn download_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let (document, data) = state.services.verification.download(&claims, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.file_name.replace(['"', '\\', '\r', '\n'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    ))
}

/// Approve or reject a pending document (admin)
#[utoipa::path(
    put,
    path = "/verification/documents/{id}/review",
    tag = "verification",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    request_body = ReviewDocument,
    responses(
        (status = 200, description = "Document reviewed", body = VerificationDocument),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "Document not found"),
        (status = 409, description = "Document already reviewed")
    )
)]
pub async fn review_document(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(review): Json<ReviewDocument>,
) -> AppResult<Json<VerificationDocument>> {
    let document = state
        .services
        .verification
        .review(&claims, id, review)
        .await?;
    Ok(Json(document))
}

/// Verification audit trail of a user (self or admin)
#[utoipa::path(
    get,
    path = "/users/{id}/verification/history",
    tag = "verification",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "History entries", body = Vec<VerificationHistoryEntry>),
        (status = 403, description = "Not your account")
    )
)]
pub async fn verification_history(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<VerificationHistoryEntry>>> {
    let history = state
        .services
        .verification
        .history(&claims, user_id)
        .await?;
    Ok(Json(history))
}
