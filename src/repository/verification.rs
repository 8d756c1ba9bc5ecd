//! Verification documents and history repository

use sqlx::{Pool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        user::VerificationStatus,
        verification::{DocumentStatus, DocumentType, VerificationDocument, VerificationHistoryEntry},
    },
};

/// Metadata of a stored upload
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub user_id: Uuid,
    pub document_type: DocumentType,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub storage_key: String,
}

#[derive(Clone)]
pub struct VerificationRepository {
    pool: Pool<Postgres>,
}

impl VerificationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Record an uploaded document and flag the account as pending review
    pub async fn create_document(&self, doc: &NewDocument) -> AppResult<VerificationDocument> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, VerificationDocument>(
            r#"
            INSERT INTO verification_documents (
                id, user_id, document_type, file_name, content_type, size_bytes, sha256, storage_key
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(doc.user_id)
        .bind(doc.document_type)
        .bind(&doc.file_name)
        .bind(&doc.content_type)
        .bind(doc.size_bytes)
        .bind(&doc.sha256)
        .bind(&doc.storage_key)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET verification_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(doc.user_id)
            .bind(VerificationStatus::Pending)
            .execute(&mut *tx)
            .await?;

        Self::append_history(
            &mut tx,
            doc.user_id,
            Some(document.id),
            "uploaded",
            VerificationStatus::Pending,
            Some(doc.user_id),
            None,
        )
        .await?;

        tx.commit().await?;
        Ok(document)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VerificationDocument> {
        sqlx::query_as::<_, VerificationDocument>("SELECT * FROM verification_documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Verification document {} not found", id)))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<VerificationDocument>> {
        let docs = sqlx::query_as::<_, VerificationDocument>(
            "SELECT * FROM verification_documents WHERE user_id = $1 ORDER BY uploaded_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(docs)
    }

    /// Apply an admin decision to a pending document and to the account
    pub async fn review(
        &self,
        id: Uuid,
        status: DocumentStatus,
        reviewer_id: Uuid,
        comment: Option<&str>,
    ) -> AppResult<VerificationDocument> {
        let mut tx = self.pool.begin().await?;

        let document = sqlx::query_as::<_, VerificationDocument>(
            r#"
            UPDATE verification_documents
            SET status = $2, reviewed_by = $3, review_comment = $4, reviewed_at = NOW()
            WHERE id = $1 AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(reviewer_id)
        .bind(comment)
        .fetch_optional(&mut *tx)
        .await?;

        let document = match document {
            Some(document) => document,
            None => {
                let current = sqlx::query_scalar::<_, DocumentStatus>(
                    "SELECT status FROM verification_documents WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
                return Err(unreviewable(id, current));
            }
        };

        let account_status = status.account_status();
        sqlx::query("UPDATE users SET verification_status = $2, updated_at = NOW() WHERE id = $1")
            .bind(document.user_id)
            .bind(account_status)
            .execute(&mut *tx)
            .await?;

        let action = match status {
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Pending => "status_changed",
        };
        Self::append_history(
            &mut tx,
            document.user_id,
            Some(document.id),
            action,
            account_status,
            Some(reviewer_id),
            comment,
        )
        .await?;

        tx.commit().await?;
        Ok(document)
    }

    /// Audit trail for a user, oldest first
    pub async fn history_for_user(&self, user_id: Uuid) -> AppResult<Vec<VerificationHistoryEntry>> {
        let entries = sqlx::query_as::<_, VerificationHistoryEntry>(
            "SELECT * FROM verification_history WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }

    /// Append an audit entry inside an open transaction
    pub(crate) async fn append_history(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        document_id: Option<Uuid>,
        action: &str,
        status: VerificationStatus,
        actor_id: Option<Uuid>,
        comment: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO verification_history (id, user_id, document_id, action, status, actor_id, comment)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(document_id)
        .bind(action)
        .bind(status)
        .bind(actor_id)
        .bind(comment)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }
}

/// Error for a review that matched no pending document
fn unreviewable(id: Uuid, current: Option<DocumentStatus>) -> AppError {
    match current {
        None => AppError::NotFound(format!("Verification document {} not found", id)),
        Some(status) => AppError::Conflict(format!(
            "Verification document {} was already reviewed ({:?})",
            id, status
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreviewable_distinguishes_missing_from_reviewed() {
        let id = Uuid::new_v4();
        assert!(matches!(unreviewable(id, None), AppError::NotFound(_)));
        assert!(matches!(
            unreviewable(id, Some(DocumentStatus::Approved)),
            AppError::Conflict(_)
        ));
    }
}
