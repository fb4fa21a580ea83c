//! Utility modules
//!
//! This module contains common utilities used by both bots,
//! including error handling, logging setup, and input normalisation.

pub mod errors;
pub mod logging;
pub mod helpers;

pub use errors::{SignupError, Result};
