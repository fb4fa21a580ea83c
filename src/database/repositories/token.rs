//! Access code repository implementation

use sqlx::PgConnection;
use chrono::{DateTime, Utc};
use crate::models::token::Token;
use crate::utils::errors::SignupError;

/// Codes are only written inside the activation transaction, so the
/// repository holds no pool of its own.
#[derive(Clone, Debug, Default)]
pub struct TokenRepository;

impl TokenRepository {
    /// Store a freshly issued code for a member
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        user_id: i64,
        code: &str,
        phone_number: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Token, SignupError> {
        let token = sqlx::query_as::<_, Token>(
            r#"
            INSERT INTO tokens (user_id, code, phone_number, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token, code, phone_number, created_at, expires_at
            "#
        )
        .bind(user_id)
        .bind(code)
        .bind(phone_number)
        .bind(Utc::now())
        .bind(expires_at)
        .fetch_one(conn)
        .await?;

        Ok(token)
    }
}
