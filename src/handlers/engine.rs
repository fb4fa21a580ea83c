//! Generic per-chat dispatcher shared by both bots
//!
//! A `Flow` describes one bot's conversation; the `Engine` owns the session
//! store and applies the same authorize / load / advance / commit cycle to
//! every inbound update.

use std::sync::Arc;
use async_trait::async_trait;
use teloxide::types::Message;
use tracing::{debug, error, warn};
use crate::i18n::I18n;
use crate::services::messenger::{deliver, Messenger, Reply};
use crate::state::{Conversation, SessionStore};
use crate::utils::errors::Result;

/// Kind of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Document,
    Photo,
}

/// Inbound event, stripped of transport details
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Text(String),
    Attachment { file_id: String, kind: AttachmentKind },
    PaymentCompleted { charge_id: String },
    Other,
}

impl Input {
    pub fn from_message(msg: &Message) -> Self {
        if let Some(payment) = msg.successful_payment() {
            return Input::PaymentCompleted {
                charge_id: payment.telegram_payment_charge_id.clone(),
            };
        }

        if let Some(document) = msg.document() {
            return Input::Attachment {
                file_id: document.file.id.to_string(),
                kind: AttachmentKind::Document,
            };
        }

        // Telegram lists sizes ascending; keep the largest
        if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
            return Input::Attachment {
                file_id: photo.file.id.to_string(),
                kind: AttachmentKind::Photo,
            };
        }

        match msg.text() {
            Some(text) => Input::Text(text.to_string()),
            None => Input::Other,
        }
    }

    /// Trimmed text, if this is a text message
    pub fn text(&self) -> Option<&str> {
        match self {
            Input::Text(text) => Some(text.trim()),
            _ => None,
        }
    }
}

/// One bot's conversation logic
#[async_trait]
pub trait Flow: Send + Sync + 'static {
    type Session: Conversation;

    /// Name used in logs
    fn name(&self) -> &'static str;

    /// Whether the chat may use this bot at all
    async fn authorize(&self, _chat_id: i64) -> Result<bool> {
        Ok(true)
    }

    /// Session for a chat that has none stored
    async fn bootstrap(&self, chat_id: i64) -> Result<Self::Session>;

    /// Handle one input and return the next session
    async fn advance(&self, chat_id: i64, session: Self::Session, input: Input) -> Result<Self::Session>;
}

pub struct Engine<F: Flow> {
    flow: F,
    sessions: Arc<dyn SessionStore<F::Session>>,
    messenger: Arc<dyn Messenger>,
    i18n: Arc<I18n>,
}

impl<F: Flow> Engine<F> {
    pub fn new(
        flow: F,
        sessions: Arc<dyn SessionStore<F::Session>>,
        messenger: Arc<dyn Messenger>,
        i18n: Arc<I18n>,
    ) -> Self {
        Self {
            flow,
            sessions,
            messenger,
            i18n,
        }
    }

    pub fn flow(&self) -> &F {
        &self.flow
    }

    /// Process one inbound update for a chat.
    ///
    /// Flow errors never escape: invariant violations reset the session,
    /// anything else leaves it untouched so the user can retry.
    pub async fn handle(&self, chat_id: i64, input: Input) -> Result<()> {
        match self.flow.authorize(chat_id).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(bot = self.flow.name(), chat_id = chat_id, "Access denied");
                deliver(self.messenger.as_ref(), chat_id, Reply::text(self.i18n.t("common.access_denied"))).await;
                return Ok(());
            }
            Err(e) => {
                self.apologize(chat_id).await;
                return Err(e);
            }
        }

        let session = match self.get_or_create(chat_id).await {
            Ok(session) => session,
            Err(e) => {
                self.apologize(chat_id).await;
                return Err(e);
            }
        };
        let step = session.step_name();

        match self.flow.advance(chat_id, session, input).await {
            Ok(next) => {
                debug!(bot = self.flow.name(), chat_id = chat_id, from = step, to = next.step_name(), "Step completed");
                self.commit(chat_id, &next).await
            }
            Err(e) if e.is_invariant_violation() => {
                warn!(bot = self.flow.name(), chat_id = chat_id, step = step, error = %e, "Inconsistent session, resetting");
                self.sessions.reset(chat_id).await?;
                self.apologize(chat_id).await;
                Ok(())
            }
            Err(e) => {
                error!(
                    bot = self.flow.name(),
                    chat_id = chat_id,
                    step = step,
                    error = %e,
                    severity = %e.severity(),
                    "Failed to handle update"
                );
                self.apologize(chat_id).await;
                Ok(())
            }
        }
    }

    /// Stored session, or a fresh one bootstrapped from persistent state
    pub async fn get_or_create(&self, chat_id: i64) -> Result<F::Session> {
        if let Some(session) = self.sessions.load(chat_id).await? {
            return Ok(session);
        }

        let session = self.flow.bootstrap(chat_id).await?;
        debug!(bot = self.flow.name(), chat_id = chat_id, step = session.step_name(), "Session bootstrapped");
        Ok(session)
    }

    pub async fn reset(&self, chat_id: i64) -> Result<()> {
        self.sessions.reset(chat_id).await
    }

    async fn commit(&self, chat_id: i64, session: &F::Session) -> Result<()> {
        if session.is_idle() {
            self.sessions.reset(chat_id).await
        } else {
            self.sessions.save(chat_id, session).await
        }
    }

    async fn apologize(&self, chat_id: i64) {
        deliver(self.messenger.as_ref(), chat_id, Reply::text(self.i18n.t("common.error"))).await;
    }
}
