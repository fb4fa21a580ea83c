//! Data models module
//!
//! This module contains the records stored by the repositories and shared
//! by both bots.

pub mod registration;
pub mod user;
pub mod token;
pub mod admin;

pub use registration::{NewRegistrationRequest, RegistrationRequest, RequestStatus, UserStatus};
pub use user::{NewUser, User};
pub use token::Token;
pub use admin::{Admin, AdminMessage, NewAdminMessage};
