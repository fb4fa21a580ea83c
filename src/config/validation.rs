//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are present before a bot starts.

use crate::utils::errors::{SignupError, Result};
use super::{BotRole, Settings, SessionBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings, role: BotRole) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_session_config(&settings.sessions)?;
    validate_logging_config(&settings.logging)?;

    if role == BotRole::Signup {
        validate_payment_config(&settings.payment)?;
    }

    Ok(())
}

/// Both tokens are needed: each bot sends notifications through the other one
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(SignupError::Config(
            "Bot token is required".to_string()
        ));
    }

    if config.admin_token.is_empty() {
        return Err(SignupError::Config(
            "Admin bot token is required".to_string()
        ));
    }

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.user.is_empty() || config.password.is_empty() || config.name.is_empty() {
        return Err(SignupError::Config(
            "Database user, password and name are required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SignupError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SignupError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate payment configuration
fn validate_payment_config(config: &super::PaymentConfig) -> Result<()> {
    if config.provider_token.is_empty() {
        return Err(SignupError::Config(
            "Payment provider token is required".to_string()
        ));
    }

    if config.amount == 0 {
        return Err(SignupError::Config(
            "Payment amount must be greater than 0".to_string()
        ));
    }

    if config.currency.len() != 3 {
        return Err(SignupError::Config(
            "Payment currency must be a three-letter ISO code".to_string()
        ));
    }

    Ok(())
}

/// Validate session storage configuration
fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.backend == SessionBackend::Redis
        && config.redis_url.as_deref().map_or(true, str::is_empty)
    {
        return Err(SignupError::Config(
            "Redis URL is required for the redis session backend".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SignupError::Config(
            format!("Invalid log level: {}. Must be one of: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_settings() -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "user-token".to_string();
        settings.bot.admin_token = "admin-token".to_string();
        settings.database.user = "ac".to_string();
        settings.database.password = "secret".to_string();
        settings.database.name = "signup".to_string();
        settings.payment.provider_token = "provider".to_string();
        settings
    }

    #[test]
    fn test_valid_settings() {
        assert!(validate_settings(&valid_settings(), BotRole::Signup).is_ok());
        assert!(validate_settings(&valid_settings(), BotRole::Admin).is_ok());
    }

    #[test]
    fn test_missing_tokens() {
        let mut settings = valid_settings();
        settings.bot.admin_token.clear();
        assert!(validate_settings(&settings, BotRole::Signup).is_err());
        assert!(validate_settings(&settings, BotRole::Admin).is_err());
    }

    #[test]
    fn test_payment_only_checked_for_signup_bot() {
        let mut settings = valid_settings();
        settings.payment.provider_token.clear();
        assert!(validate_settings(&settings, BotRole::Signup).is_err());
        assert!(validate_settings(&settings, BotRole::Admin).is_ok());
    }

    #[test]
    fn test_database_pool_sizes() {
        let mut settings = valid_settings();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings, BotRole::Admin).is_err());
    }

    #[test]
    fn test_redis_backend_requires_url() {
        let mut settings = valid_settings();
        settings.sessions.backend = SessionBackend::Redis;
        assert!(validate_settings(&settings, BotRole::Admin).is_err());

        settings.sessions.redis_url = Some("redis://localhost:6379".to_string());
        assert!(validate_settings(&settings, BotRole::Admin).is_ok());
    }

    #[test]
    fn test_invalid_log_level() {
        let mut settings = valid_settings();
        settings.logging.level = "verbose".to_string();
        assert!(validate_settings(&settings, BotRole::Admin).is_err());
    }
}
