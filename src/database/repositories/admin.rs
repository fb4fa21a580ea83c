//! Admin repository implementation

use sqlx::PgPool;
use chrono::Utc;
use crate::models::admin::{Admin, AdminMessage, NewAdminMessage};
use crate::utils::errors::SignupError;

#[derive(Clone, Debug)]
pub struct AdminRepository {
    pool: PgPool,
}

impl AdminRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check whether a chat may operate the admin bot
    pub async fn is_admin(&self, chat_id: i64) -> Result<bool, SignupError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM admins WHERE chat_id = $1)"
        )
        .bind(chat_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    /// Add an admin; returns `false` if the chat was already one
    pub async fn create(&self, chat_id: i64) -> Result<bool, SignupError> {
        let result = sqlx::query(
            r#"
            INSERT INTO admins (chat_id, created_at)
            VALUES ($1, $2)
            ON CONFLICT (chat_id) DO NOTHING
            "#
        )
        .bind(chat_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List all admins
    pub async fn list(&self) -> Result<Vec<Admin>, SignupError> {
        let admins = sqlx::query_as::<_, Admin>(
            "SELECT id, chat_id, created_at FROM admins ORDER BY created_at ASC"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(admins)
    }

    // Admin message methods
    /// Append a message from an applicant
    pub async fn create_message(&self, message: NewAdminMessage) -> Result<AdminMessage, SignupError> {
        let created = sqlx::query_as::<_, AdminMessage>(
            r#"
            INSERT INTO admin_messages (telegram_user_id, first_name, last_name, message, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, telegram_user_id, first_name, last_name, message, created_at
            "#
        )
        .bind(message.telegram_user_id)
        .bind(message.first_name)
        .bind(message.last_name)
        .bind(message.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Newest messages first
    pub async fn latest_messages(&self, limit: i64) -> Result<Vec<AdminMessage>, SignupError> {
        let messages = sqlx::query_as::<_, AdminMessage>(
            r#"
            SELECT id, telegram_user_id, first_name, last_name, message, created_at
            FROM admin_messages
            ORDER BY created_at DESC, id DESC
            LIMIT $1
            "#
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
