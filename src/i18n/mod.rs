//! Internationalization module
//!
//! All texts the bots send are kept in `translations/{lang}.json`.

pub mod loader;

pub use loader::I18n;
