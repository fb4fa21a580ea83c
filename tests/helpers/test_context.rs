//! Test context wiring both bots to in-memory collaborators

use std::sync::Arc;
use tempfile::TempDir;
use ac_signup::config::{PaymentConfig, StorageConfig};
use ac_signup::database::Store;
use ac_signup::handlers::{AdminFlow, Engine, Input, UserFlow};
use ac_signup::i18n::I18n;
use ac_signup::models::RegistrationRequest;
use ac_signup::services::{Messenger, PaymentService, Reply};
use ac_signup::state::{AdminSession, MemorySessionStore, SessionStore, UserSession};

use super::{FakeFileStore, MemoryStore, RecordingMessenger};

pub const ADMIN_CHAT: i64 = 100;

/// Both bots sharing one store, as in production
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    /// What the signup bot sent
    pub user_bot: Arc<RecordingMessenger>,
    /// What the admin bot sent
    pub admin_bot: Arc<RecordingMessenger>,
    pub files: Arc<FakeFileStore>,
    pub i18n: Arc<I18n>,
    pub user_sessions: Arc<MemorySessionStore<UserSession>>,
    pub admin_sessions: Arc<MemorySessionStore<AdminSession>>,
    pub signup: Engine<UserFlow>,
    pub admin: Engine<AdminFlow>,
    pub temp_dir: TempDir,
}

pub fn test_i18n() -> I18n {
    I18n::from_json("ru", include_str!("../../translations/ru.json")).expect("bundled translations parse")
}

impl TestContext {
    pub async fn new() -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let storage = StorageConfig {
            documents_dir: temp_dir.path().join("doc_files").display().to_string(),
            agreements_dir: temp_dir.path().join("agreements").display().to_string(),
            privileges_dir: temp_dir.path().join("privileges").display().to_string(),
        };
        std::fs::create_dir_all(&storage.privileges_dir).expect("Failed to create privileges dir");

        let store = Arc::new(MemoryStore::new());
        let user_bot = Arc::new(RecordingMessenger::new());
        let admin_bot = Arc::new(RecordingMessenger::new());
        let files = Arc::new(FakeFileStore::new(&storage.documents_dir));
        let i18n = Arc::new(test_i18n());
        let user_sessions = Arc::new(MemorySessionStore::<UserSession>::new());
        let admin_sessions = Arc::new(MemorySessionStore::<AdminSession>::new());

        let dyn_store: Arc<dyn Store> = store.clone();
        let user_messenger: Arc<dyn Messenger> = user_bot.clone();
        let admin_messenger: Arc<dyn Messenger> = admin_bot.clone();

        let user_flow = UserFlow::new(
            dyn_store.clone(),
            files.clone(),
            user_messenger.clone(),
            admin_messenger.clone(),
            PaymentService::new(dyn_store.clone(), PaymentConfig::default()),
            i18n.clone(),
            storage,
        );
        let admin_flow = AdminFlow::new(
            dyn_store,
            admin_messenger.clone(),
            user_messenger.clone(),
            i18n.clone(),
        );

        let user_store: Arc<dyn SessionStore<UserSession>> = user_sessions.clone();
        let admin_store: Arc<dyn SessionStore<AdminSession>> = admin_sessions.clone();

        Self {
            signup: Engine::new(user_flow, user_store, user_messenger, i18n.clone()),
            admin: Engine::new(admin_flow, admin_store, admin_messenger, i18n.clone()),
            store,
            user_bot,
            admin_bot,
            files,
            i18n,
            user_sessions,
            admin_sessions,
            temp_dir,
        }
    }

    /// Context with `ADMIN_CHAT` registered as an admin
    pub async fn with_admin() -> Self {
        let ctx = Self::new().await;
        ctx.store.add_admin(ADMIN_CHAT).await.unwrap();
        ctx
    }

    pub fn t(&self, key: &str) -> String {
        self.i18n.t(key)
    }

    pub fn button(&self, key: &str) -> String {
        self.i18n.t(&format!("buttons.{}", key))
    }

    pub async fn user_says(&self, chat_id: i64, text: &str) {
        self.signup
            .handle(chat_id, Input::Text(text.to_string()))
            .await
            .expect("signup engine failed");
    }

    pub async fn user_presses(&self, chat_id: i64, button: &str) {
        let caption = self.button(button);
        self.user_says(chat_id, &caption).await;
    }

    pub async fn user_uploads(&self, chat_id: i64, file_id: &str, kind: ac_signup::handlers::AttachmentKind) {
        self.signup
            .handle(
                chat_id,
                Input::Attachment {
                    file_id: file_id.to_string(),
                    kind,
                },
            )
            .await
            .expect("signup engine failed");
    }

    pub async fn user_pays(&self, chat_id: i64, charge_id: &str) {
        self.signup
            .handle(
                chat_id,
                Input::PaymentCompleted {
                    charge_id: charge_id.to_string(),
                },
            )
            .await
            .expect("signup engine failed");
    }

    pub async fn admin_says(&self, chat_id: i64, text: &str) {
        self.admin
            .handle(chat_id, Input::Text(text.to_string()))
            .await
            .expect("admin engine failed");
    }

    pub async fn admin_presses(&self, button: &str) {
        let caption = self.button(button);
        self.admin_says(ADMIN_CHAT, &caption).await;
    }

    pub async fn user_session(&self, chat_id: i64) -> Option<UserSession> {
        self.user_sessions.load(chat_id).await.unwrap()
    }

    pub async fn admin_session(&self, chat_id: i64) -> Option<AdminSession> {
        self.admin_sessions.load(chat_id).await.unwrap()
    }

    pub fn last_user_reply(&self, chat_id: i64) -> Reply {
        self.user_bot
            .last_reply_to(chat_id)
            .expect("signup bot sent nothing to this chat")
    }

    pub fn last_admin_reply(&self) -> Reply {
        self.admin_bot
            .last_reply_to(ADMIN_CHAT)
            .expect("admin bot sent nothing to the admin")
    }

    /// Walk a chat through the whole form and return the stored request
    pub async fn register(&self, chat_id: i64, first_name: &str) -> RegistrationRequest {
        self.user_presses(chat_id, "start_registration").await;
        self.user_says(chat_id, first_name).await;
        self.user_says(chat_id, "Петров").await;
        self.user_says(chat_id, "15.03.1999").await;
        self.user_says(chat_id, "Выпускник").await;
        self.user_uploads(chat_id, &format!("doc-{}", chat_id), ac_signup::handlers::AttachmentKind::Document)
            .await;
        self.user_says(chat_id, "8 (999) 123-45-67").await;
        self.user_presses(chat_id, "yes").await;
        self.user_presses(chat_id, "understood").await;
        self.user_presses(chat_id, "yes").await;

        self.store
            .latest_request(chat_id)
            .await
            .unwrap()
            .expect("registration did not create a request")
    }
}
