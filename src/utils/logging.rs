//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! shared by the signup and admin bots.

use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{SignupError, Result};

/// Initialize logging based on configuration.
///
/// The returned guard flushes the file writer on drop and must be held
/// for the lifetime of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.directory, &config.file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(non_blocking))
        .try_init()
        .map_err(|e| SignupError::Config(format!("Failed to initialize logging: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log applicant actions with structured data
pub fn log_user_action(chat_id: i64, action: &str, details: Option<&str>) {
    info!(
        chat_id = chat_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, request_id: Option<i64>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        request_id = request_id,
        details = details,
        "Admin action performed"
    );
}

/// Log payment lifecycle events
pub fn log_payment_event(chat_id: i64, event: &str, charge_id: Option<&str>) {
    info!(
        chat_id = chat_id,
        event = event,
        charge_id = charge_id,
        "Payment event"
    );
}
