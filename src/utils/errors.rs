//! Error handling for the signup bots
//!
//! This module defines the main error type used by both bots and
//! classifies errors the way the dispatcher reacts to them.

use thiserror::Error;

/// Main error type for the signup application
#[derive(Error, Debug)]
pub enum SignupError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram file download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Registration request not found: {request_id}")]
    RequestNotFound { request_id: i64 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Session is missing required field: {0}")]
    MissingSessionData(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for signup operations
pub type Result<T> = std::result::Result<T, SignupError>;

impl SignupError {
    /// Check if the error is recoverable by retrying the same user action
    pub fn is_recoverable(&self) -> bool {
        match self {
            SignupError::Database(_) => true,
            SignupError::Migration(_) => false,
            SignupError::Telegram(_) => true,
            SignupError::Download(_) => true,
            SignupError::Redis(_) => true,
            SignupError::Serialization(_) => false,
            SignupError::Io(_) => true,
            SignupError::ConfigLoad(_) => false,
            SignupError::Config(_) => false,
            SignupError::RequestNotFound { .. } => false,
            SignupError::InvalidStateTransition { .. } => false,
            SignupError::MissingSessionData(_) => false,
            SignupError::InvalidInput(_) => true,
        }
    }

    /// Errors meaning the conversation state itself is inconsistent.
    ///
    /// The dispatcher resets the session instead of keeping it.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            SignupError::InvalidStateTransition { .. }
                | SignupError::MissingSessionData(_)
                | SignupError::RequestNotFound { .. }
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SignupError::Migration(_) => ErrorSeverity::Critical,
            SignupError::ConfigLoad(_) => ErrorSeverity::Critical,
            SignupError::Config(_) => ErrorSeverity::Critical,
            SignupError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            SignupError::MissingSessionData(_) => ErrorSeverity::Warning,
            SignupError::RequestNotFound { .. } => ErrorSeverity::Warning,
            SignupError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
