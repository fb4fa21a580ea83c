//! Per-chat conversation sessions
//!
//! Each bot keeps one session per chat. A session is the current step plus
//! whatever the step needs to remember.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use crate::models::{NewRegistrationRequest, UserStatus};
use crate::utils::errors::{SignupError, Result};

/// Behaviour the dispatcher needs from a session type
pub trait Conversation: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Stable name of the current step, used in logs
    fn step_name(&self) -> &'static str;

    /// Idle sessions carry no state worth keeping
    fn is_idle(&self) -> bool;
}

/// Sub-steps of the consent sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgreementStage {
    /// Waiting for "Да" on the personal data consent
    Consent,
    /// Waiting for "Понятно" on the revocation notice
    Revocation,
    /// Waiting for "Да" on the privacy policy
    PrivacyPolicy,
}

/// Steps of the applicant-facing bot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum UserStep {
    Start,
    FirstName,
    LastName,
    BirthDate,
    UserStatus,
    Document,
    PhoneNumber,
    Agreement { stage: AgreementStage },
    WriteAdmin,
    AwaitingPayment,
    WaitingPaymentConfirmation,
    NeedsRevision { request_id: i64 },
}

impl UserStep {
    pub fn name(&self) -> &'static str {
        match self {
            UserStep::Start => "start",
            UserStep::FirstName => "first_name",
            UserStep::LastName => "last_name",
            UserStep::BirthDate => "birth_date",
            UserStep::UserStatus => "user_status",
            UserStep::Document => "document",
            UserStep::PhoneNumber => "phone_number",
            UserStep::Agreement { .. } => "agreement",
            UserStep::WriteAdmin => "write_admin",
            UserStep::AwaitingPayment => "awaiting_payment",
            UserStep::WaitingPaymentConfirmation => "waiting_payment_confirmation",
            UserStep::NeedsRevision { .. } => "needs_revision",
        }
    }
}

/// Applicant fields collected so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub user_status: Option<UserStatus>,
    pub document_path: Option<String>,
    pub phone_number: Option<String>,
}

impl RegistrationDraft {
    /// Build the request to persist; every field must have been collected
    pub fn into_request(self, chat_id: i64) -> Result<NewRegistrationRequest> {
        Ok(NewRegistrationRequest {
            telegram_user_id: chat_id,
            first_name: self.first_name.ok_or(SignupError::MissingSessionData("first_name"))?,
            last_name: self.last_name.ok_or(SignupError::MissingSessionData("last_name"))?,
            birth_date: self.birth_date.ok_or(SignupError::MissingSessionData("birth_date"))?,
            user_status: self.user_status.ok_or(SignupError::MissingSessionData("user_status"))?,
            document_path: self
                .document_path
                .ok_or(SignupError::MissingSessionData("document_path"))?,
            phone_number: self
                .phone_number
                .ok_or(SignupError::MissingSessionData("phone_number"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub step: UserStep,
    pub draft: RegistrationDraft,
}

impl UserSession {
    pub fn at(step: UserStep) -> Self {
        Self {
            step,
            draft: RegistrationDraft::default(),
        }
    }

    /// Move to `step` keeping the draft
    pub fn advance(mut self, step: UserStep) -> Self {
        self.step = step;
        self
    }
}

impl Default for UserSession {
    fn default() -> Self {
        Self::at(UserStep::Start)
    }
}

impl Conversation for UserSession {
    fn step_name(&self) -> &'static str {
        self.step.name()
    }

    fn is_idle(&self) -> bool {
        self.step == UserStep::Start
    }
}

/// Steps of the review bot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum AdminStep {
    MainMenu,
    ViewingRequest { request_id: i64 },
    EnteringRejectReason { request_id: i64 },
    EnteringRevisionReason { request_id: i64 },
    AddingAdmin,
}

impl AdminStep {
    pub fn name(&self) -> &'static str {
        match self {
            AdminStep::MainMenu => "main_menu",
            AdminStep::ViewingRequest { .. } => "viewing_request",
            AdminStep::EnteringRejectReason { .. } => "entering_reject_reason",
            AdminStep::EnteringRevisionReason { .. } => "entering_revision_reason",
            AdminStep::AddingAdmin => "adding_admin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSession {
    pub step: AdminStep,
}

impl AdminSession {
    pub fn at(step: AdminStep) -> Self {
        Self { step }
    }
}

impl Default for AdminSession {
    fn default() -> Self {
        Self::at(AdminStep::MainMenu)
    }
}

impl Conversation for AdminSession {
    fn step_name(&self) -> &'static str {
        self.step.name()
    }

    fn is_idle(&self) -> bool {
        self.step == AdminStep::MainMenu
    }
}
