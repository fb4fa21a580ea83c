//! Admin review conversation
//!
//! Admins go through pending requests oldest first and approve, reject or
//! return them for revision. Applicants are notified through the signup bot.

use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use tracing::info;
use crate::database::Store;
use crate::i18n::I18n;
use crate::models::{RegistrationRequest, RequestStatus};
use crate::services::messenger::{deliver, deliver_document, Messenger, Reply};
use crate::state::{AdminSession, AdminStep};
use crate::utils::errors::Result;
use crate::utils::helpers::format_birth_date;
use crate::utils::logging::log_admin_action;
use super::engine::{Flow, Input};

/// How many applicant messages the inbox shows
const INBOX_SIZE: i64 = 20;

pub struct AdminFlow {
    store: Arc<dyn Store>,
    messenger: Arc<dyn Messenger>,
    /// Signup bot, the only one applicants talk to
    user_messenger: Arc<dyn Messenger>,
    i18n: Arc<I18n>,
}

impl AdminFlow {
    pub fn new(
        store: Arc<dyn Store>,
        messenger: Arc<dyn Messenger>,
        user_messenger: Arc<dyn Messenger>,
        i18n: Arc<I18n>,
    ) -> Self {
        Self {
            store,
            messenger,
            user_messenger,
            i18n,
        }
    }

    fn button(&self, key: &str) -> String {
        self.i18n.t(&format!("buttons.{}", key))
    }

    fn pressed(&self, input: &Input, key: &str) -> bool {
        input.text() == Some(self.button(key).as_str())
    }

    async fn reply(&self, chat_id: i64, reply: Reply) {
        deliver(self.messenger.as_ref(), chat_id, reply).await;
    }

    fn main_menu_keyboard(&self) -> Vec<Vec<String>> {
        vec![
            vec![self.button("check_requests")],
            vec![self.button("user_messages")],
            vec![self.button("add_admin")],
        ]
    }

    fn request_keyboard(&self) -> Vec<Vec<String>> {
        vec![
            vec![self.button("approve"), self.button("reject")],
            vec![self.button("revision"), self.button("main_menu")],
        ]
    }

    fn cancel_keyboard(&self) -> Vec<Vec<String>> {
        vec![vec![self.button("cancel")]]
    }

    async fn main_menu(&self, chat_id: i64, key: &str) -> Result<AdminSession> {
        self.reply(
            chat_id,
            Reply::text(self.i18n.t(key)).keyboard(self.main_menu_keyboard()),
        )
        .await;
        Ok(AdminSession::default())
    }

    // Request queue

    fn request_card(&self, request: &RegistrationRequest) -> String {
        let request_id = request.id.to_string();
        let birth_date = format_birth_date(request.birth_date);
        self.i18n.t_with(
            "admin.request_card",
            &[
                ("request_id", request_id.as_str()),
                ("first_name", request.first_name.as_str()),
                ("last_name", request.last_name.as_str()),
                ("birth_date", birth_date.as_str()),
                ("status", request.user_status.label()),
                ("phone", request.phone_number.as_str()),
            ],
        )
    }

    async fn show_request(&self, chat_id: i64, request: &RegistrationRequest) -> AdminSession {
        self.reply(
            chat_id,
            Reply::text(self.request_card(request)).keyboard(self.request_keyboard()),
        )
        .await;

        if !request.document_path.is_empty() {
            deliver_document(self.messenger.as_ref(), chat_id, Path::new(&request.document_path)).await;
        }

        AdminSession::at(AdminStep::ViewingRequest { request_id: request.id })
    }

    /// Present the oldest pending request, or report an empty queue
    async fn show_next_pending(&self, chat_id: i64) -> Result<AdminSession> {
        match self.store.next_pending_request().await? {
            Some(request) => Ok(self.show_request(chat_id, &request).await),
            None => self.main_menu(chat_id, "admin.no_requests").await,
        }
    }

    /// Back from reason entry: the same request while it is still pending
    async fn return_to_request(&self, chat_id: i64, request_id: i64) -> Result<AdminSession> {
        match self.store.request_by_id(request_id).await? {
            Some(request) if request.status == RequestStatus::Pending => {
                Ok(self.show_request(chat_id, &request).await)
            }
            _ => self.show_next_pending(chat_id).await,
        }
    }

    async fn handle_viewing(&self, chat_id: i64, session: AdminSession, request_id: i64, input: Input) -> Result<AdminSession> {
        if self.pressed(&input, "approve") {
            let request = self
                .store
                .set_request_status(request_id, RequestStatus::Approved, None)
                .await?;
            log_admin_action(chat_id, "approve", Some(request_id), None);
            info!(admin_id = chat_id, request_id = request_id, "Request approved");

            self.reply(chat_id, Reply::text(self.i18n.t("admin.approved"))).await;
            deliver(
                self.user_messenger.as_ref(),
                request.telegram_user_id,
                Reply::text(self.i18n.t("notify.approved"))
                    .keyboard(vec![vec![self.button("pay"), self.button("write_admin")]]),
            )
            .await;

            return self.show_next_pending(chat_id).await;
        }

        if self.pressed(&input, "reject") {
            self.reply(
                chat_id,
                Reply::text(self.i18n.t("admin.reject_reason_prompt")).keyboard(self.cancel_keyboard()),
            )
            .await;
            return Ok(AdminSession::at(AdminStep::EnteringRejectReason { request_id }));
        }

        if self.pressed(&input, "revision") {
            self.reply(
                chat_id,
                Reply::text(self.i18n.t("admin.revision_reason_prompt")).keyboard(self.cancel_keyboard()),
            )
            .await;
            return Ok(AdminSession::at(AdminStep::EnteringRevisionReason { request_id }));
        }

        self.reply(
            chat_id,
            Reply::text(self.i18n.t("admin.choose_action")).keyboard(self.request_keyboard()),
        )
        .await;
        Ok(session)
    }

    /// Shared handling of reject and revision reasons
    async fn handle_reason(
        &self,
        chat_id: i64,
        session: AdminSession,
        request_id: i64,
        status: RequestStatus,
        input: Input,
    ) -> Result<AdminSession> {
        if self.pressed(&input, "cancel") {
            return self.return_to_request(chat_id, request_id).await;
        }

        let Some(reason) = input.text().filter(|text| !text.is_empty()) else {
            self.reply(chat_id, Reply::text(self.i18n.t("admin.reason_empty"))).await;
            return Ok(session);
        };

        let request = self
            .store
            .set_request_status(request_id, status, Some(reason.to_string()))
            .await?;
        log_admin_action(chat_id, status.as_str(), Some(request_id), Some(reason));
        info!(admin_id = chat_id, request_id = request_id, status = %status, "Request reviewed");

        let (confirmation, notification, keyboard) = match status {
            RequestStatus::NeedsRevision => (
                "admin.revision_sent",
                "notify.needs_revision",
                vec![vec![self.button("upload_new_document"), self.button("write_admin")]],
            ),
            _ => (
                "admin.rejected",
                "notify.rejected",
                vec![vec![self.button("write_admin")]],
            ),
        };

        self.reply(chat_id, Reply::text(self.i18n.t(confirmation))).await;
        deliver(
            self.user_messenger.as_ref(),
            request.telegram_user_id,
            Reply::text(self.i18n.t_with(notification, &[("reason", reason)])).keyboard(keyboard),
        )
        .await;

        self.show_next_pending(chat_id).await
    }

    // Inbox and admin management

    async fn show_messages(&self, chat_id: i64) -> Result<AdminSession> {
        let messages = self.store.latest_admin_messages(INBOX_SIZE).await?;
        if messages.is_empty() {
            return self.main_menu(chat_id, "admin.no_messages").await;
        }

        for message in &messages {
            let sender = message.telegram_user_id.to_string();
            let entry = self.i18n.t_with(
                "admin.message_entry",
                &[
                    ("first_name", message.first_name.as_str()),
                    ("last_name", message.last_name.as_str()),
                    ("chat_id", sender.as_str()),
                    ("message", message.message.as_str()),
                ],
            );
            self.reply(chat_id, Reply::text(entry)).await;
        }

        self.main_menu(chat_id, "admin.back_to_menu").await
    }

    async fn handle_adding_admin(&self, chat_id: i64, session: AdminSession, input: Input) -> Result<AdminSession> {
        if self.pressed(&input, "cancel") {
            return self.main_menu(chat_id, "admin.main_menu").await;
        }

        let Some(new_admin) = input.text().and_then(|text| text.parse::<i64>().ok()) else {
            self.reply(
                chat_id,
                Reply::text(self.i18n.t("admin.add_admin_invalid")).keyboard(self.cancel_keyboard()),
            )
            .await;
            return Ok(session);
        };

        if self.store.add_admin(new_admin).await? {
            log_admin_action(chat_id, "add_admin", None, Some(&new_admin.to_string()));
            self.main_menu(chat_id, "admin.add_admin_success").await
        } else {
            self.main_menu(chat_id, "admin.add_admin_exists").await
        }
    }
}

#[async_trait]
impl Flow for AdminFlow {
    type Session = AdminSession;

    fn name(&self) -> &'static str {
        "admin"
    }

    async fn authorize(&self, chat_id: i64) -> Result<bool> {
        self.store.is_admin(chat_id).await
    }

    async fn bootstrap(&self, _chat_id: i64) -> Result<AdminSession> {
        Ok(AdminSession::default())
    }

    async fn advance(&self, chat_id: i64, session: AdminSession, input: Input) -> Result<AdminSession> {
        if input.text() == Some("/start") || self.pressed(&input, "main_menu") {
            return self.main_menu(chat_id, "admin.main_menu").await;
        }

        match session.step {
            AdminStep::MainMenu => {
                if self.pressed(&input, "check_requests") {
                    self.show_next_pending(chat_id).await
                } else if self.pressed(&input, "user_messages") {
                    self.show_messages(chat_id).await
                } else if self.pressed(&input, "add_admin") {
                    self.reply(
                        chat_id,
                        Reply::text(self.i18n.t("admin.add_admin_prompt")).keyboard(self.cancel_keyboard()),
                    )
                    .await;
                    Ok(AdminSession::at(AdminStep::AddingAdmin))
                } else {
                    self.main_menu(chat_id, "admin.main_menu").await
                }
            }
            AdminStep::ViewingRequest { request_id } => {
                self.handle_viewing(chat_id, session, request_id, input).await
            }
            AdminStep::EnteringRejectReason { request_id } => {
                self.handle_reason(chat_id, session, request_id, RequestStatus::Rejected, input)
                    .await
            }
            AdminStep::EnteringRevisionReason { request_id } => {
                self.handle_reason(chat_id, session, request_id, RequestStatus::NeedsRevision, input)
                    .await
            }
            AdminStep::AddingAdmin => self.handle_adding_admin(chat_id, session, input).await,
        }
    }
}
