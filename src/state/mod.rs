//! State management module
//!
//! This module holds the per-chat conversation sessions of both bots
//! and the stores that keep them between updates.

pub mod session;
pub mod storage;

pub use session::{
    AdminSession, AdminStep, AgreementStage, Conversation, RegistrationDraft, UserSession, UserStep,
};
pub use storage::{create_session_store, MemorySessionStore, RedisSessionStore, SessionStore};
