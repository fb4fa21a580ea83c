//! Process startup shared by both binaries

use std::sync::Arc;
use anyhow::Context;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use crate::config::{BotRole, Settings};
use crate::database::{create_pool, run_migrations, DatabaseService, Store};
use crate::handlers::{admin_schema, signup_schema, AdminFlow, Engine, UserFlow};
use crate::i18n::I18n;
use crate::services::{Messenger, PaymentService, TelegramFileStore, TelegramMessenger};
use crate::state::{create_session_store, AdminSession, UserSession};
use crate::utils::logging::init_logging;

/// Everything both bots need before they start polling
struct Runtime {
    settings: Settings,
    database: Arc<DatabaseService>,
    i18n: Arc<I18n>,
    user_bot: Bot,
    admin_bot: Bot,
    _log_guard: WorkerGuard,
}

async fn start(role: BotRole) -> anyhow::Result<Runtime> {
    let settings = Settings::new().context("Failed to load configuration")?;
    settings.validate(role).context("Invalid configuration")?;

    let log_guard = init_logging(&settings.logging)?;
    info!(bot = role.as_str(), "Starting {}", crate::info());

    info!("Connecting to database...");
    let pool = create_pool(&settings.database)
        .await
        .context("Failed to connect to the database")?;
    run_migrations(&pool).await?;
    let database = Arc::new(DatabaseService::new(pool));

    info!("Loading translations...");
    let i18n = Arc::new(I18n::load(&settings.i18n).await?);

    let user_bot = Bot::new(&settings.bot.token);
    let admin_bot = Bot::new(&settings.bot.admin_token);

    Ok(Runtime {
        settings,
        database,
        i18n,
        user_bot,
        admin_bot,
        _log_guard: log_guard,
    })
}

/// Run the applicant-facing bot until Ctrl-C
pub async fn run_signup_bot() -> anyhow::Result<()> {
    let runtime = start(BotRole::Signup).await?;
    let store: Arc<dyn Store> = runtime.database.clone();
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(runtime.user_bot.clone()));
    let admin_messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(runtime.admin_bot.clone()));

    let flow = UserFlow::new(
        store.clone(),
        Arc::new(TelegramFileStore::new(
            runtime.user_bot.clone(),
            &runtime.settings.storage.documents_dir,
        )),
        messenger.clone(),
        admin_messenger,
        PaymentService::new(store, runtime.settings.payment.clone()),
        runtime.i18n.clone(),
        runtime.settings.storage.clone(),
    );
    let sessions = create_session_store::<UserSession>(&runtime.settings.sessions, "signup").await?;
    let engine = Arc::new(Engine::new(flow, sessions, messenger, runtime.i18n.clone()));

    info!("Signup bot is ready, starting polling...");
    Dispatcher::builder(runtime.user_bot.clone(), signup_schema())
        .dependencies(dptree::deps![engine])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Signup bot has been shut down.");
    Ok(())
}

/// Run the admin review bot until Ctrl-C
pub async fn run_admin_bot() -> anyhow::Result<()> {
    let runtime = start(BotRole::Admin).await?;

    runtime.database.seed_admins(&runtime.settings.bot.admin_ids).await?;
    if runtime.database.list_admins().await?.is_empty() {
        warn!("No admins registered; set bot.admin_ids to allow access");
    }

    let store: Arc<dyn Store> = runtime.database.clone();
    let messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(runtime.admin_bot.clone()));
    let user_messenger: Arc<dyn Messenger> = Arc::new(TelegramMessenger::new(runtime.user_bot.clone()));

    let flow = AdminFlow::new(store, messenger.clone(), user_messenger, runtime.i18n.clone());
    let sessions = create_session_store::<AdminSession>(&runtime.settings.sessions, "admin").await?;
    let engine = Arc::new(Engine::new(flow, sessions, messenger, runtime.i18n.clone()));

    info!("Admin bot is ready, starting polling...");
    Dispatcher::builder(runtime.admin_bot.clone(), admin_schema())
        .dependencies(dptree::deps![engine])
        .default_handler(|upd| async move {
            warn!("Unhandled update: {:?}", upd);
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Admin bot has been shut down.");
    Ok(())
}
