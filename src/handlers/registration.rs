//! Applicant-facing conversation
//!
//! Collects the registration form, walks the applicant through the consent
//! documents, handles resubmission after review and takes the payment.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use tokio::fs;
use tracing::{error, info, warn};
use crate::config::StorageConfig;
use crate::database::Store;
use crate::i18n::I18n;
use crate::models::{NewAdminMessage, RegistrationRequest, RequestStatus, UserStatus};
use crate::services::messenger::{deliver, deliver_document, Messenger, Reply};
use crate::services::payment::{PaymentOutcome, PaymentService};
use crate::services::files::FileStore;
use crate::state::{AgreementStage, UserSession, UserStep};
use crate::utils::errors::{SignupError, Result};
use crate::utils::helpers::{normalize_phone_number, parse_birth_date};
use crate::utils::logging::{log_payment_event, log_user_action};
use super::engine::{AttachmentKind, Flow, Input};

const MAX_PRIVILEGE_IMAGES: usize = 10;
const AGREEMENT_FILE: &str = "agreement.docx";
const PRIVACY_POLICY_FILE: &str = "privacy_policy.docx";

pub struct UserFlow {
    store: Arc<dyn Store>,
    files: Arc<dyn FileStore>,
    messenger: Arc<dyn Messenger>,
    /// Admin bot, used to notify admins
    admin_messenger: Arc<dyn Messenger>,
    payments: PaymentService,
    i18n: Arc<I18n>,
    storage: StorageConfig,
}

impl UserFlow {
    pub fn new(
        store: Arc<dyn Store>,
        files: Arc<dyn FileStore>,
        messenger: Arc<dyn Messenger>,
        admin_messenger: Arc<dyn Messenger>,
        payments: PaymentService,
        i18n: Arc<I18n>,
        storage: StorageConfig,
    ) -> Self {
        Self {
            store,
            files,
            messenger,
            admin_messenger,
            payments,
            i18n,
            storage,
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

    async fn say(&self, chat_id: i64, key: &str) {
        self.reply(chat_id, Reply::text(self.i18n.t(key))).await;
    }

    // Keyboards

    fn start_keyboard(&self, has_request: bool) -> Vec<Vec<String>> {
        let mut rows = vec![
            vec![self.button("start_registration")],
            vec![self.button("privileges")],
        ];
        if has_request {
            rows.push(vec![self.button("write_admin")]);
        }
        rows
    }

    fn payment_keyboard(&self) -> Vec<Vec<String>> {
        vec![vec![self.button("pay"), self.button("write_admin")]]
    }

    fn revision_keyboard(&self) -> Vec<Vec<String>> {
        vec![vec![self.button("upload_new_document"), self.button("write_admin")]]
    }

    fn yes_no_keyboard(&self) -> Vec<Vec<String>> {
        vec![vec![self.button("yes"), self.button("no")]]
    }

    fn cancel_keyboard(&self) -> Vec<Vec<String>> {
        vec![vec![self.button("cancel")]]
    }

    fn status_keyboard(&self) -> Vec<Vec<String>> {
        vec![UserStatus::ALL.iter().map(|status| status.label().to_string()).collect()]
    }

    /// Keyboard matching the step the chat will bootstrap into next
    async fn home_keyboard(&self, chat_id: i64) -> Result<Vec<Vec<String>>> {
        let latest = self.store.latest_request(chat_id).await?;
        self.keyboard_for(chat_id, latest.as_ref()).await
    }

    async fn keyboard_for(&self, chat_id: i64, latest: Option<&RegistrationRequest>) -> Result<Vec<Vec<String>>> {
        let keyboard = match latest.map(|request| request.status) {
            Some(RequestStatus::Approved) if !self.payments.is_member(chat_id).await? => self.payment_keyboard(),
            Some(RequestStatus::NeedsRevision) => self.revision_keyboard(),
            _ => self.start_keyboard(latest.is_some()),
        };
        Ok(keyboard)
    }

    /// Answer with `key` and return the chat to its idle state
    async fn go_home(&self, chat_id: i64, key: &str) -> Result<UserSession> {
        let keyboard = self.home_keyboard(chat_id).await?;
        self.reply(chat_id, Reply::text(self.i18n.t(key)).keyboard(keyboard)).await;
        Ok(UserSession::default())
    }

    // Idle menu

    async fn handle_start(&self, chat_id: i64, input: Input) -> Result<UserSession> {
        if self.pressed(&input, "start_registration") {
            log_user_action(chat_id, "registration_started", None);
            self.reply(chat_id, Reply::text(self.i18n.t("registration.first_name_prompt")).remove_keyboard())
                .await;
            return Ok(UserSession::at(UserStep::FirstName));
        }

        if self.pressed(&input, "write_admin") {
            return self.begin_write_admin(chat_id).await;
        }

        if self.pressed(&input, "privileges") {
            self.send_privileges(chat_id).await;
            return Ok(UserSession::default());
        }

        let has_request = self.store.latest_request(chat_id).await?.is_some();
        self.reply(
            chat_id,
            Reply::text(self.i18n.t("registration.welcome"))
                .html()
                .keyboard(self.start_keyboard(has_request)),
        )
        .await;
        Ok(UserSession::default())
    }

    async fn send_privileges(&self, chat_id: i64) {
        let images = match privilege_images(Path::new(&self.storage.privileges_dir)).await {
            Ok(images) => images,
            Err(e) => {
                error!(chat_id = chat_id, error = %e, "Failed to read privileges directory");
                self.say(chat_id, "privileges.load_failed").await;
                return;
            }
        };

        if images.is_empty() {
            self.say(chat_id, "privileges.empty").await;
            return;
        }

        if let Err(e) = self
            .messenger
            .send_photos(chat_id, &images, &self.i18n.t("privileges.caption"))
            .await
        {
            error!(chat_id = chat_id, error = %e, "Failed to send privileges album");
            self.say(chat_id, "privileges.send_failed").await;
        }
    }

    // Registration form

    async fn handle_form(&self, chat_id: i64, mut session: UserSession, input: Input) -> Result<UserSession> {
        match session.step {
            UserStep::FirstName => match input.text().filter(|text| !text.is_empty()) {
                Some(first_name) => {
                    session.draft.first_name = Some(first_name.to_string());
                    self.say(chat_id, "registration.last_name_prompt").await;
                    Ok(session.advance(UserStep::LastName))
                }
                None => {
                    self.say(chat_id, "registration.first_name_empty").await;
                    Ok(session)
                }
            },
            UserStep::LastName => match input.text().filter(|text| !text.is_empty()) {
                Some(last_name) => {
                    session.draft.last_name = Some(last_name.to_string());
                    self.say(chat_id, "registration.birth_date_prompt").await;
                    Ok(session.advance(UserStep::BirthDate))
                }
                None => {
                    self.say(chat_id, "registration.last_name_empty").await;
                    Ok(session)
                }
            },
            UserStep::BirthDate => match input.text().and_then(parse_birth_date) {
                Some(birth_date) => {
                    session.draft.birth_date = Some(birth_date);
                    self.reply(
                        chat_id,
                        Reply::text(self.i18n.t("registration.status_prompt")).keyboard(self.status_keyboard()),
                    )
                    .await;
                    Ok(session.advance(UserStep::UserStatus))
                }
                None => {
                    self.say(chat_id, "registration.birth_date_invalid").await;
                    Ok(session)
                }
            },
            UserStep::UserStatus => match input.text().and_then(UserStatus::from_label) {
                Some(status) => {
                    session.draft.user_status = Some(status);
                    let documents = self.i18n.t(&format!("registration.documents.{}", status.as_str()));
                    self.reply(
                        chat_id,
                        Reply::text(self.i18n.t_with("registration.document_prompt", &[("documents", documents.as_str())]))
                            .remove_keyboard(),
                    )
                    .await;
                    Ok(session.advance(UserStep::Document))
                }
                None => {
                    self.reply(
                        chat_id,
                        Reply::text(self.i18n.t("registration.status_invalid")).keyboard(self.status_keyboard()),
                    )
                    .await;
                    Ok(session)
                }
            },
            UserStep::Document => {
                let Input::Attachment { file_id, .. } = input else {
                    self.say(chat_id, "registration.document_invalid").await;
                    return Ok(session);
                };

                match self.files.save(&file_id).await {
                    Ok(path) => {
                        session.draft.document_path = Some(path.display().to_string());
                        self.say(chat_id, "registration.phone_prompt").await;
                        Ok(session.advance(UserStep::PhoneNumber))
                    }
                    Err(e) => {
                        error!(chat_id = chat_id, error = %e, "Failed to save uploaded document");
                        self.say(chat_id, "registration.document_save_failed").await;
                        Ok(session)
                    }
                }
            }
            UserStep::PhoneNumber => match input.text().and_then(normalize_phone_number) {
                Some(phone_number) => {
                    session.draft.phone_number = Some(phone_number);
                    self.present_consent(chat_id).await;
                    Ok(session.advance(UserStep::Agreement {
                        stage: AgreementStage::Consent,
                    }))
                }
                None => {
                    self.say(chat_id, "registration.phone_invalid").await;
                    Ok(session)
                }
            },
            _ => Err(SignupError::InvalidStateTransition {
                from: session.step.name().to_string(),
                to: "registration form".to_string(),
            }),
        }
    }

    // Consent sequence

    async fn present_consent(&self, chat_id: i64) {
        self.say(chat_id, "registration.agreement_intro").await;
        let document = Path::new(&self.storage.agreements_dir).join(AGREEMENT_FILE);
        deliver_document(self.messenger.as_ref(), chat_id, &document).await;
        self.reply(
            chat_id,
            Reply::text(self.i18n.t("registration.agreement_consent")).keyboard(self.yes_no_keyboard()),
        )
        .await;
    }

    async fn handle_agreement(
        &self,
        chat_id: i64,
        session: UserSession,
        stage: AgreementStage,
        input: Input,
    ) -> Result<UserSession> {
        if self.pressed(&input, "no") {
            log_user_action(chat_id, "consent_declined", Some(stage_name(stage)));
            if let Some(path) = session.draft.document_path.as_deref() {
                self.discard_file(Path::new(path)).await;
            }
            return self.go_home(chat_id, "registration.declined").await;
        }

        match stage {
            AgreementStage::Consent if self.pressed(&input, "yes") => {
                self.reply(
                    chat_id,
                    Reply::text(self.i18n.t("registration.agreement_revocation"))
                        .keyboard(vec![vec![self.button("understood")]]),
                )
                .await;
                Ok(session.advance(UserStep::Agreement {
                    stage: AgreementStage::Revocation,
                }))
            }
            AgreementStage::Revocation if self.pressed(&input, "understood") => {
                self.say(chat_id, "registration.privacy_intro").await;
                let document = Path::new(&self.storage.agreements_dir).join(PRIVACY_POLICY_FILE);
                deliver_document(self.messenger.as_ref(), chat_id, &document).await;
                self.reply(
                    chat_id,
                    Reply::text(self.i18n.t("registration.privacy_confirm")).keyboard(self.yes_no_keyboard()),
                )
                .await;
                Ok(session.advance(UserStep::Agreement {
                    stage: AgreementStage::PrivacyPolicy,
                }))
            }
            AgreementStage::PrivacyPolicy if self.pressed(&input, "yes") => {
                let request = session.draft.into_request(chat_id)?;
                let created = self.store.create_request(request).await?;
                info!(chat_id = chat_id, request_id = created.id, "Registration request submitted");
                log_user_action(chat_id, "registration_submitted", None);
                self.go_home(chat_id, "registration.submitted").await
            }
            _ => {
                let keyboard = match stage {
                    AgreementStage::Revocation => vec![vec![self.button("understood")]],
                    _ => self.yes_no_keyboard(),
                };
                self.reply(chat_id, Reply::text(self.i18n.t("common.choose_option")).keyboard(keyboard))
                    .await;
                Ok(session)
            }
        }
    }

    // Messages to admins

    async fn begin_write_admin(&self, chat_id: i64) -> Result<UserSession> {
        if self.store.latest_request(chat_id).await?.is_none() {
            self.say(chat_id, "write_admin.unavailable").await;
            return Ok(UserSession::default());
        }

        self.reply(
            chat_id,
            Reply::text(self.i18n.t("write_admin.prompt")).keyboard(self.cancel_keyboard()),
        )
        .await;
        Ok(UserSession::at(UserStep::WriteAdmin))
    }

    async fn handle_write_admin(&self, chat_id: i64, session: UserSession, input: Input) -> Result<UserSession> {
        if self.pressed(&input, "cancel") {
            return self.go_home(chat_id, "common.cancelled").await;
        }

        let Some(text) = input.text().filter(|text| !text.is_empty()) else {
            self.say(chat_id, "write_admin.empty").await;
            return Ok(session);
        };

        let Some(request) = self.store.latest_request(chat_id).await? else {
            return self.go_home(chat_id, "write_admin.unavailable").await;
        };
        // Fallible lookups go first; the message is stored at most once
        let keyboard = self.keyboard_for(chat_id, Some(&request)).await?;

        let saved = self
            .store
            .save_admin_message(NewAdminMessage {
                telegram_user_id: chat_id,
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                message: text.to_string(),
            })
            .await?;
        log_user_action(chat_id, "admin_message_sent", None);

        let sender = chat_id.to_string();
        let notification = self.i18n.t_with(
            "write_admin.notification",
            &[
                ("first_name", saved.first_name.as_str()),
                ("last_name", saved.last_name.as_str()),
                ("chat_id", sender.as_str()),
                ("message", saved.message.as_str()),
            ],
        );
        self.notify_admins(&notification).await;

        self.reply(chat_id, Reply::text(self.i18n.t("write_admin.sent")).keyboard(keyboard))
            .await;
        Ok(UserSession::default())
    }

    async fn notify_admins(&self, text: &str) {
        let admins = match self.store.list_admins().await {
            Ok(admins) => admins,
            Err(e) => {
                warn!(error = %e, "Failed to load admins for notification");
                return;
            }
        };

        for admin in admins {
            deliver(self.admin_messenger.as_ref(), admin.chat_id, Reply::text(text)).await;
        }
    }

    // Payment

    async fn handle_awaiting_payment(&self, chat_id: i64, session: UserSession, input: Input) -> Result<UserSession> {
        if self.pressed(&input, "cancel") {
            return self.go_home(chat_id, "common.cancelled").await;
        }

        if self.pressed(&input, "write_admin") {
            return self.begin_write_admin(chat_id).await;
        }

        if !self.pressed(&input, "pay") {
            self.reply(
                chat_id,
                Reply::text(self.i18n.t("payment.choose"))
                    .keyboard(vec![vec![self.button("pay"), self.button("cancel")]]),
            )
            .await;
            return Ok(session);
        }

        if self.payments.is_member(chat_id).await? {
            return self.go_home(chat_id, "payment.already_active").await;
        }

        match self.messenger.send_invoice(chat_id, &self.payments.invoice(chat_id)).await {
            Ok(()) => {
                log_payment_event(chat_id, "invoice_sent", None);
                Ok(session.advance(UserStep::WaitingPaymentConfirmation))
            }
            Err(e) => {
                error!(chat_id = chat_id, error = %e, "Failed to send invoice");
                self.say(chat_id, "payment.invoice_failed").await;
                Ok(session)
            }
        }
    }

    async fn handle_waiting_payment(&self, chat_id: i64, session: UserSession, input: Input) -> Result<UserSession> {
        if self.pressed(&input, "cancel") {
            return self.go_home(chat_id, "common.cancelled").await;
        }

        self.reply(
            chat_id,
            Reply::text(self.i18n.t("payment.already_initiated")).keyboard(self.cancel_keyboard()),
        )
        .await;
        Ok(session)
    }

    async fn handle_payment(&self, chat_id: i64, session: UserSession, charge_id: &str) -> Result<UserSession> {
        let outcome = match self.payments.complete(chat_id, charge_id).await {
            Ok(outcome) => outcome,
            Err(e) if e.is_invariant_violation() => return Err(e),
            Err(e) => {
                error!(chat_id = chat_id, charge_id = charge_id, error = %e, "Failed to activate member");
                self.say(chat_id, "payment.activation_failed").await;
                return Ok(session);
            }
        };

        match outcome {
            PaymentOutcome::Activated { code, .. } => {
                self.say(chat_id, "payment.anthem").await;
                self.reply(
                    chat_id,
                    Reply::text(self.i18n.t_with("payment.welcome", &[("code", code.as_str())]))
                        .html()
                        .keyboard(vec![vec![self.button("write_admin")]]),
                )
                .await;
            }
            PaymentOutcome::AlreadyActive => self.say(chat_id, "payment.already_active").await,
            PaymentOutcome::NoApprovedRequest => self.say(chat_id, "payment.no_approved_request").await,
        }

        Ok(UserSession::default())
    }

    // Resubmission after review

    async fn handle_needs_revision(
        &self,
        chat_id: i64,
        session: UserSession,
        request_id: i64,
        input: Input,
    ) -> Result<UserSession> {
        if self.pressed(&input, "cancel") {
            return self.go_home(chat_id, "common.cancelled").await;
        }

        if self.pressed(&input, "write_admin") {
            return self.begin_write_admin(chat_id).await;
        }

        if self.pressed(&input, "upload_new_document") {
            self.reply(
                chat_id,
                Reply::text(self.i18n.t("revision.prompt")).keyboard(self.cancel_keyboard()),
            )
            .await;
            return Ok(session);
        }

        let Input::Attachment { file_id, kind } = input else {
            let mut keyboard = self.revision_keyboard();
            keyboard[0].push(self.button("cancel"));
            self.reply(chat_id, Reply::text(self.i18n.t("revision.invalid")).keyboard(keyboard))
                .await;
            return Ok(session);
        };

        let previous = self
            .store
            .request_by_id(request_id)
            .await?
            .ok_or(SignupError::RequestNotFound { request_id })?;

        let path = match self.files.save(&file_id).await {
            Ok(path) => path,
            Err(e) => {
                error!(chat_id = chat_id, request_id = request_id, error = %e, "Failed to save revised document");
                self.say(chat_id, "registration.document_save_failed").await;
                return Ok(session);
            }
        };

        let updated = self
            .store
            .resubmit_document(request_id, chat_id, &path.display().to_string())
            .await?;
        info!(chat_id = chat_id, request_id = request_id, "Document resubmitted for review");

        if !previous.document_path.is_empty() && path.as_path() != Path::new(&previous.document_path) {
            self.discard_file(Path::new(&previous.document_path)).await;
        }

        self.notify_admins(&self.revision_notification(&updated, kind)).await;
        self.go_home(chat_id, "revision.resubmitted").await
    }

    fn revision_notification(&self, request: &RegistrationRequest, kind: AttachmentKind) -> String {
        let file_kind = match kind {
            AttachmentKind::Document => self.i18n.t("revision.file_kind.document"),
            AttachmentKind::Photo => self.i18n.t("revision.file_kind.photo"),
        };
        let request_id = request.id.to_string();
        self.i18n.t_with(
            "revision.notification",
            &[
                ("file_kind", file_kind.as_str()),
                ("request_id", request_id.as_str()),
                ("first_name", request.first_name.as_str()),
                ("last_name", request.last_name.as_str()),
                ("status", request.user_status.label()),
                ("phone", request.phone_number.as_str()),
            ],
        )
    }

    async fn discard_file(&self, path: &Path) {
        if let Err(e) = self.files.remove(path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove stored document");
        }
    }
}

#[async_trait]
impl Flow for UserFlow {
    type Session = UserSession;

    fn name(&self) -> &'static str {
        "signup"
    }

    async fn bootstrap(&self, chat_id: i64) -> Result<UserSession> {
        let step = match self.store.latest_request(chat_id).await? {
            Some(request) => match request.status {
                RequestStatus::Approved if !self.payments.is_member(chat_id).await? => UserStep::AwaitingPayment,
                RequestStatus::NeedsRevision => UserStep::NeedsRevision { request_id: request.id },
                _ => UserStep::Start,
            },
            None => UserStep::Start,
        };
        Ok(UserSession::at(step))
    }

    async fn advance(&self, chat_id: i64, session: UserSession, input: Input) -> Result<UserSession> {
        if let Input::PaymentCompleted { charge_id } = &input {
            return self.handle_payment(chat_id, session, charge_id).await;
        }

        match session.step.clone() {
            UserStep::Start => self.handle_start(chat_id, input).await,
            UserStep::FirstName
            | UserStep::LastName
            | UserStep::BirthDate
            | UserStep::UserStatus
            | UserStep::Document
            | UserStep::PhoneNumber => self.handle_form(chat_id, session, input).await,
            UserStep::Agreement { stage } => self.handle_agreement(chat_id, session, stage, input).await,
            UserStep::WriteAdmin => self.handle_write_admin(chat_id, session, input).await,
            UserStep::AwaitingPayment => self.handle_awaiting_payment(chat_id, session, input).await,
            UserStep::WaitingPaymentConfirmation => self.handle_waiting_payment(chat_id, session, input).await,
            UserStep::NeedsRevision { request_id } => {
                self.handle_needs_revision(chat_id, session, request_id, input).await
            }
        }
    }
}

fn stage_name(stage: AgreementStage) -> &'static str {
    match stage {
        AgreementStage::Consent => "consent",
        AgreementStage::Revocation => "revocation",
        AgreementStage::PrivacyPolicy => "privacy_policy",
    }
}

/// Up to ten images from `dir`, in name order
async fn privilege_images(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir).await?;
    let mut images = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| matches!(ext.to_ascii_lowercase().as_str(), "jpg" | "jpeg" | "png"))
            .unwrap_or(false);
        if is_image {
            images.push(path);
        }
    }

    images.sort();
    images.truncate(MAX_PRIVILEGE_IMAGES);
    Ok(images)
}
