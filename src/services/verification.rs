//! Verification documents: upload, download and admin review

use std::sync::Arc;

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        notification::{NewNotification, KIND_VERIFICATION},
        user::UserClaims,
        verification::{
            DocumentStatus, DocumentType, ReviewDocument, VerificationDocument,
            VerificationHistoryEntry,
        },
    },
    repository::{verification::NewDocument, Repository},
};

use super::{notifications::NotificationsService, storage::DocumentStorage};

/// A file received from a multipart upload
#[derive(Debug)]
pub struct Upload {
    pub document_type: DocumentType,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct VerificationService {
    repository: Repository,
    storage: Arc<dyn DocumentStorage>,
    notifications: NotificationsService,
    max_upload_bytes: usize,
}

impl VerificationService {
    pub fn new(
        repository: Repository,
        storage: Arc<dyn DocumentStorage>,
        notifications: NotificationsService,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            repository,
            storage,
            notifications,
            max_upload_bytes,
        }
    }

    /// Store an uploaded file and put the account under review
    pub async fn upload(&self, user_id: Uuid, upload: Upload) -> AppResult<VerificationDocument> {
        let extension = check_upload(&upload.content_type, upload.data.len(), self.max_upload_bytes)?;

        let sha256 = hex::encode(Sha256::digest(&upload.data));
        let size_bytes = upload.data.len() as i64;
        let storage_key = format!("{}/{}.{}", user_id, Uuid::new_v4(), extension);

        self.storage.put(&storage_key, upload.data).await?;

        let record = NewDocument {
            user_id,
            document_type: upload.document_type,
            file_name: upload.file_name,
            content_type: upload.content_type,
            size_bytes,
            sha256,
            storage_key: storage_key.clone(),
        };
        match self.repository.verification.create_document(&record).await {
            Ok(document) => {
                tracing::info!(user_id = %user_id, document_id = %document.id, "verification document uploaded");
                Ok(document)
            }
            Err(e) => {
                if let Err(cleanup) = self.storage.delete(&storage_key).await {
                    tracing::warn!(key = %storage_key, "failed to remove orphaned upload: {}", cleanup);
                }
                Err(e)
            }
        }
    }

    pub async fn list_for_user(&self, claims: &UserClaims, user_id: Uuid) -> AppResult<Vec<VerificationDocument>> {
        claims.require_self_or_admin(user_id)?;
        self.repository.verification.list_for_user(user_id).await
    }

    /// Document metadata and content, for its owner or an admin
    pub async fn download(&self, claims: &UserClaims, id: Uuid) -> AppResult<(VerificationDocument, Vec<u8>)> {
        let document = self.repository.verification.get_by_id(id).await?;
        claims.require_self_or_admin(document.user_id)?;
        let data = self.storage.get(&document.storage_key).await?;
        Ok((document, data))
    }

    /// Approve or reject a pending document (admin)
    pub async fn review(&self, claims: &UserClaims, id: Uuid, review: ReviewDocument) -> AppResult<VerificationDocument> {
        claims.require_admin()?;
        if review.status == DocumentStatus::Pending {
            return Err(AppError::BadRequest(
                "Review status must be APPROVED or REJECTED".to_string(),
            ));
        }

        let document = self
            .repository
            .verification
            .review(id, review.status, claims.user_id(), review.comment.as_deref())
            .await?;

        tracing::info!(
            document_id = %id,
            user_id = %document.user_id,
            reviewer = %claims.user_id(),
            status = ?review.status,
            "verification document reviewed"
        );

        let (title, body) = match review.status {
            DocumentStatus::Approved => (
                "Account verified".to_string(),
                "Your verification document was approved".to_string(),
            ),
            _ => (
                "Verification rejected".to_string(),
                review
                    .comment
                    .unwrap_or_else(|| "Your verification document was rejected".to_string()),
            ),
        };
        self.notifications
            .notify(NewNotification {
                user_id: document.user_id,
                kind: KIND_VERIFICATION,
                title,
                body,
                related_request_id: None,
            })
            .await;

        Ok(document)
    }

    pub async fn history(&self, claims: &UserClaims, user_id: Uuid) -> AppResult<Vec<VerificationHistoryEntry>> {
        claims.require_self_or_admin(user_id)?;
        self.repository.verification.history_for_user(user_id).await
    }
}

/// Check type and size of an upload, returning the file extension to store it under
fn check_upload(content_type: &str, size: usize, max_bytes: usize) -> AppResult<&'static str> {
    let extension = match content_type {
        "application/pdf" => "pdf",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        other => {
            return Err(AppError::Validation(format!(
                "Unsupported document type '{}' (PDF, JPEG or PNG expected)",
                other
            )))
        }
    };
    if size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::Validation(format!(
            "Uploaded file exceeds the {} byte limit",
            max_bytes
        )));
    }
    Ok(extension)
}
