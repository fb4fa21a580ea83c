//! One-time access code model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Code linking a member to the companion web application.
///
/// `token` stays empty until the web application issues its credential.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Token {
    pub id: i64,
    pub user_id: i64,
    pub token: Option<String>,
    pub code: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
