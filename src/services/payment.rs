//! Payment completion and member activation

use std::sync::Arc;
use chrono::{DateTime, Months, Utc};
use tracing::{info, warn};
use crate::config::PaymentConfig;
use crate::database::{Activation, Store};
use crate::models::{NewUser, RequestStatus};
use crate::services::messenger::Invoice;
use crate::utils::errors::{SignupError, Result};
use crate::utils::helpers::generate_auth_code;
use crate::utils::logging::log_payment_event;

/// What happened when a successful payment was reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// A member was created or an expired one renewed, with a fresh access code
    Activated { code: String, expires_at: DateTime<Utc> },
    /// The chat holds an unexpired membership; nothing was created
    AlreadyActive,
    /// The chat has no approved request to pay for
    NoApprovedRequest,
}

pub struct PaymentService {
    store: Arc<dyn Store>,
    config: PaymentConfig,
}

impl PaymentService {
    pub fn new(store: Arc<dyn Store>, config: PaymentConfig) -> Self {
        Self { store, config }
    }

    /// Invoice for the membership fee
    pub fn invoice(&self, chat_id: i64) -> Invoice {
        Invoice {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            payload: format!("ac_signup_payload_{}", chat_id),
            provider_token: self.config.provider_token.clone(),
            currency: self.config.currency.clone(),
            label: self.config.label.clone(),
            amount: self.config.amount,
        }
    }

    /// Whether the chat holds a membership that has not expired yet
    pub async fn is_member(&self, chat_id: i64) -> Result<bool> {
        let now = Utc::now();
        Ok(self
            .store
            .find_member(chat_id)
            .await?
            .is_some_and(|member| member.is_active_at(now)))
    }

    /// Turn the chat's approved request into a member with a fresh access code
    pub async fn complete(&self, chat_id: i64, charge_id: &str) -> Result<PaymentOutcome> {
        log_payment_event(chat_id, "payment_received", Some(charge_id));

        if self.is_member(chat_id).await? {
            warn!(chat_id = chat_id, charge_id = charge_id, "Duplicate payment for an active member");
            return Ok(PaymentOutcome::AlreadyActive);
        }

        let request = match self.store.latest_request(chat_id).await? {
            Some(request) if request.status == RequestStatus::Approved => request,
            other => {
                warn!(
                    chat_id = chat_id,
                    status = ?other.map(|r| r.status),
                    "Payment received without an approved request"
                );
                return Ok(PaymentOutcome::NoApprovedRequest);
            }
        };

        let expires_at = self.expiry_from(Utc::now())?;
        let code = generate_auth_code();

        match self
            .store
            .activate_member(NewUser::from_request(&request, expires_at), &code)
            .await?
        {
            Activation::Created { user, token } => {
                info!(
                    chat_id = chat_id,
                    user_id = user.id,
                    token_id = token.id,
                    "Member activated"
                );
                log_payment_event(chat_id, "member_activated", Some(charge_id));
                Ok(PaymentOutcome::Activated { code, expires_at })
            }
            Activation::AlreadyActive => Ok(PaymentOutcome::AlreadyActive),
        }
    }

    fn expiry_from(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        now.checked_add_months(Months::new(self.config.subscription_months))
            .ok_or_else(|| SignupError::InvalidInput("Subscription expiry is out of range".to_string()))
    }
}
