//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgConnectOptions;

/// Which of the two bots is being started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotRole {
    Signup,
    Admin,
}

impl BotRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotRole::Signup => "signup",
            BotRole::Admin => "admin",
        }
    }
}

/// Main application configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub payment: PaymentConfig,
    pub storage: StorageConfig,
    pub sessions: SessionConfig,
    pub i18n: I18nConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot credentials
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BotConfig {
    /// Token of the applicant-facing bot
    pub token: String,
    /// Token of the review bot
    pub admin_token: String,
    /// Admin chat ids inserted at admin bot startup
    pub admin_ids: Vec<i64>,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Connection options built field by field, so credentials need no escaping
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: String::new(),
            password: String::new(),
            name: String::new(),
            max_connections: 10,
            min_connections: 1,
            acquire_timeout_seconds: 30,
        }
    }
}

/// Telegram Payments configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub provider_token: String,
    pub currency: String,
    /// Price in minor units (kopecks)
    pub amount: u32,
    pub title: String,
    pub description: String,
    pub label: String,
    pub subscription_months: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            provider_token: String::new(),
            currency: "RUB".to_string(),
            amount: 250_000,
            title: "Регистрация AC".to_string(),
            description: "Регистрация в программе Ambassador Card".to_string(),
            label: "Регистрация".to_string(),
            subscription_months: 1,
        }
    }
}

/// File locations
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where uploaded applicant documents are written
    pub documents_dir: String,
    /// Holds `agreement.docx` and `privacy_policy.docx`
    pub agreements_dir: String,
    /// Images sent for the privileges overview
    pub privileges_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_dir: "doc_files".to_string(),
            agreements_dir: "agreements".to_string(),
            privileges_dir: "privileges".to_string(),
        }
    }
}

/// Session storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// Conversation session storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub redis_url: Option<String>,
    pub prefix: String,
    /// Zero keeps sessions until they are reset
    pub ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::Memory,
            redis_url: None,
            prefix: "acsignup:".to_string(),
            ttl_seconds: 0,
        }
    }
}

/// Internationalization configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct I18nConfig {
    pub default_language: String,
    pub translations_dir: String,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: "ru".to_string(),
            translations_dir: "translations".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: "logs".to_string(),
            file_prefix: "ac-signup.log".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("ACSIGNUP")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings for the given bot
    pub fn validate(&self, role: BotRole) -> Result<(), crate::utils::errors::SignupError> {
        super::validation::validate_settings(self, role)
    }
}
