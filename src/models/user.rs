//! Member model, created once an approved applicant has paid

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use super::registration::{RegistrationRequest, UserStatus};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub status: UserStatus,
    pub phone_number: String,
    pub photo_path: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Membership lapses at `expires_at`
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub status: UserStatus,
    pub phone_number: String,
    pub expires_at: DateTime<Utc>,
}

impl NewUser {
    pub fn from_request(request: &RegistrationRequest, expires_at: DateTime<Utc>) -> Self {
        Self {
            telegram_user_id: request.telegram_user_id,
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            birth_date: request.birth_date,
            status: request.user_status,
            phone_number: request.phone_number.clone(),
            expires_at,
        }
    }
}
