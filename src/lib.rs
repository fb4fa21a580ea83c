//! Ambassador Card signup bots
//!
//! Two Telegram bots sharing one store: the signup bot collects registration
//! requests and takes the membership payment, the admin bot reviews requests.
//! Both run on the same per-chat conversation engine.

pub mod app;
pub mod config;
pub mod database;
pub mod handlers;
pub mod i18n;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{SignupError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, Store};
pub use handlers::{AdminFlow, Engine, Flow, Input, UserFlow};
pub use i18n::I18n;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
