//! Admin and admin message models

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: i64,
    pub chat_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Free-text message an applicant wrote to the admins
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminMessage {
    pub id: i64,
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAdminMessage {
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub message: String,
}
