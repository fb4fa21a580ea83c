//! `Messenger` that records everything instead of calling Telegram

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use ac_signup::services::{Invoice, Messenger, Reply};
use ac_signup::utils::errors::{Result, SignupError};

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Message { chat_id: i64, reply: Reply },
    Document { chat_id: i64, path: PathBuf },
    Photos { chat_id: i64, paths: Vec<PathBuf>, caption: String },
    Invoice { chat_id: i64, invoice: Invoice },
}

impl Sent {
    pub fn chat_id(&self) -> i64 {
        match self {
            Sent::Message { chat_id, .. }
            | Sent::Document { chat_id, .. }
            | Sent::Photos { chat_id, .. }
            | Sent::Invoice { chat_id, .. } => *chat_id,
        }
    }
}

#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<Sent>>,
    fail_invoices: AtomicBool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_invoices(&self, fail: bool) {
        self.fail_invoices.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<Sent> {
        self.sent().into_iter().filter(|s| s.chat_id() == chat_id).collect()
    }

    pub fn replies_to(&self, chat_id: i64) -> Vec<Reply> {
        self.sent_to(chat_id)
            .into_iter()
            .filter_map(|s| match s {
                Sent::Message { reply, .. } => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn texts_to(&self, chat_id: i64) -> Vec<String> {
        self.replies_to(chat_id).into_iter().map(|r| r.text).collect()
    }

    pub fn last_reply_to(&self, chat_id: i64) -> Option<Reply> {
        self.replies_to(chat_id).pop()
    }

    pub fn documents_to(&self, chat_id: i64) -> Vec<PathBuf> {
        self.sent_to(chat_id)
            .into_iter()
            .filter_map(|s| match s {
                Sent::Document { path, .. } => Some(path),
                _ => None,
            })
            .collect()
    }

    pub fn invoices_to(&self, chat_id: i64) -> Vec<Invoice> {
        self.sent_to(chat_id)
            .into_iter()
            .filter_map(|s| match s {
                Sent::Invoice { invoice, .. } => Some(invoice),
                _ => None,
            })
            .collect()
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()> {
        self.record(Sent::Message { chat_id, reply });
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, path: &Path) -> Result<()> {
        self.record(Sent::Document {
            chat_id,
            path: path.to_path_buf(),
        });
        Ok(())
    }

    async fn send_photos(&self, chat_id: i64, paths: &[PathBuf], caption: &str) -> Result<()> {
        self.record(Sent::Photos {
            chat_id,
            paths: paths.to_vec(),
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()> {
        if self.fail_invoices.load(Ordering::SeqCst) {
            return Err(SignupError::InvalidInput("invoice rejected".to_string()));
        }
        self.record(Sent::Invoice {
            chat_id,
            invoice: invoice.clone(),
        });
        Ok(())
    }
}
