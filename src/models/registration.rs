//! Registration request model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::fmt;
use crate::utils::helpers::normalize_text;

/// Review status of a registration request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
    NeedsRevision,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
            RequestStatus::NeedsRevision => "needs_revision",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Applicant's relation to the university
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "text", rename_all = "snake_case")]
pub enum UserStatus {
    Student,
    Employee,
    Graduate,
}

impl UserStatus {
    pub const ALL: [UserStatus; 3] = [UserStatus::Student, UserStatus::Employee, UserStatus::Graduate];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Student => "student",
            UserStatus::Employee => "employee",
            UserStatus::Graduate => "graduate",
        }
    }

    /// Button caption shown to applicants
    pub fn label(&self) -> &'static str {
        match self {
            UserStatus::Student => "Студент",
            UserStatus::Employee => "Сотрудник",
            UserStatus::Graduate => "Выпускник",
        }
    }

    /// Match a typed or pressed caption, ignoring case and surrounding spaces
    pub fn from_label(text: &str) -> Option<Self> {
        let text = normalize_text(text);
        Self::ALL
            .into_iter()
            .find(|status| status.label().to_lowercase() == text)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RegistrationRequest {
    pub id: i64,
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub user_status: UserStatus,
    pub document_path: String,
    pub phone_number: String,
    pub status: RequestStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRegistrationRequest {
    pub telegram_user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub user_status: UserStatus,
    pub document_path: String,
    pub phone_number: String,
}
