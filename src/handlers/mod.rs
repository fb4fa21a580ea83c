//! Bot handlers module
//!
//! This module contains the conversation logic of both bots:
//! - `engine`: the generic per-chat dispatcher
//! - `registration`: the applicant-facing flow
//! - `review`: the admin review flow
//! - `schema`: teloxide update routing

pub mod engine;
pub mod registration;
pub mod review;
pub mod schema;

pub use engine::{AttachmentKind, Engine, Flow, Input};
pub use registration::UserFlow;
pub use review::AdminFlow;
pub use schema::{admin_schema, signup_schema};
