//! Member repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{NewUser, User};
use crate::utils::errors::SignupError;

const USER_COLUMNS: &str = "id, telegram_user_id, first_name, last_name, birth_date, status, \
     phone_number, photo_path, expires_at, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a member, or renew the chat's row once its membership expired.
    ///
    /// Returns `None` when the chat already holds an unexpired membership.
    pub async fn insert(&self, conn: &mut PgConnection, user: &NewUser) -> Result<Option<User>, SignupError> {
        let now = Utc::now();
        let created = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users
                (telegram_user_id, first_name, last_name, birth_date, status,
                 phone_number, expires_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (telegram_user_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                birth_date = EXCLUDED.birth_date,
                status = EXCLUDED.status,
                phone_number = EXCLUDED.phone_number,
                expires_at = EXCLUDED.expires_at,
                updated_at = EXCLUDED.updated_at
            WHERE users.expires_at <= EXCLUDED.updated_at
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.telegram_user_id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.birth_date)
        .bind(user.status)
        .bind(&user.phone_number)
        .bind(user.expires_at)
        .bind(now)
        .bind(now)
        .fetch_optional(conn)
        .await?;

        Ok(created)
    }

    /// Find member by Telegram ID
    pub async fn find_by_telegram_id(&self, telegram_user_id: i64) -> Result<Option<User>, SignupError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE telegram_user_id = $1"
        ))
        .bind(telegram_user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
