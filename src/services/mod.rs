//! Services module
//!
//! Collaborators of the conversation flows: outbound messaging,
//! document storage and payment processing.

pub mod messenger;
pub mod files;
pub mod payment;

pub use messenger::{deliver, deliver_document, Invoice, Markup, Messenger, Reply, TelegramMessenger};
pub use files::{FileStore, TelegramFileStore};
pub use payment::{PaymentOutcome, PaymentService};
