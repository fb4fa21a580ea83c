//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod registration;
pub mod user;
pub mod token;
pub mod admin;

// Re-export repositories
pub use registration::RegistrationRepository;
pub use user::UserRepository;
pub use token::TokenRepository;
pub use admin::AdminRepository;
