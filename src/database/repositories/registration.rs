//! Registration request repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::registration::{NewRegistrationRequest, RegistrationRequest, RequestStatus};
use crate::utils::errors::SignupError;

const REQUEST_COLUMNS: &str = "id, telegram_user_id, first_name, last_name, birth_date, user_status, \
     document_path, phone_number, status, rejection_reason, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct RegistrationRepository {
    pool: PgPool,
}

impl RegistrationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new request in `pending` status
    pub async fn create(&self, request: NewRegistrationRequest) -> Result<RegistrationRequest, SignupError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, RegistrationRequest>(&format!(
            r#"
            INSERT INTO registration_requests
                (telegram_user_id, first_name, last_name, birth_date, user_status,
                 document_path, phone_number, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(request.telegram_user_id)
        .bind(request.first_name)
        .bind(request.last_name)
        .bind(request.birth_date)
        .bind(request.user_status)
        .bind(request.document_path)
        .bind(request.phone_number)
        .bind(RequestStatus::Pending)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Find request by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<RegistrationRequest>, SignupError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM registration_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// The most recent request of a chat, which decides where its session starts
    pub async fn find_latest_by_chat(&self, telegram_user_id: i64) -> Result<Option<RegistrationRequest>, SignupError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM registration_requests
            WHERE telegram_user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#
        ))
        .bind(telegram_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Oldest pending request
    pub async fn next_pending(&self) -> Result<Option<RegistrationRequest>, SignupError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM registration_requests
            WHERE status = $1
            ORDER BY created_at ASC, id ASC
            LIMIT 1
            "#
        ))
        .bind(RequestStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Set the review status; the reason is stored as given and cleared when `None`
    pub async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        reason: Option<String>,
    ) -> Result<RegistrationRequest, SignupError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            r#"
            UPDATE registration_requests
            SET status = $2, rejection_reason = $3, updated_at = $4
            WHERE id = $1
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(reason)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        request.ok_or(SignupError::RequestNotFound { request_id: id })
    }

    /// Attach a new document and send the request back to review
    pub async fn resubmit_document(
        &self,
        id: i64,
        telegram_user_id: i64,
        document_path: &str,
    ) -> Result<RegistrationRequest, SignupError> {
        let request = sqlx::query_as::<_, RegistrationRequest>(&format!(
            r#"
            UPDATE registration_requests
            SET document_path = $3, status = $4, rejection_reason = NULL, updated_at = $5
            WHERE id = $1 AND telegram_user_id = $2
            RETURNING {REQUEST_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(telegram_user_id)
        .bind(document_path)
        .bind(RequestStatus::Pending)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        request.ok_or(SignupError::RequestNotFound { request_id: id })
    }
}
