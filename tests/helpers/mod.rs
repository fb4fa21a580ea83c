//! Test helpers module
//!
//! Shared fixtures for the integration tests: in-memory collaborators for
//! driving both bots without Telegram, a wiremock Telegram API and a
//! Postgres test database.

#![allow(dead_code)]

pub mod database_helper;
pub mod fake_files;
pub mod memory_store;
pub mod recording_messenger;
pub mod telegram_mock;
pub mod test_context;

pub use database_helper::*;
pub use fake_files::*;
pub use memory_store::*;
pub use recording_messenger::*;
pub use telegram_mock::*;
pub use test_context::*;
