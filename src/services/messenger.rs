//! Outbound messaging
//!
//! Flows talk to Telegram through the `Messenger` trait so that they can be
//! driven without a network in tests.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, InputMedia, InputMediaPhoto, KeyboardButton, KeyboardMarkup, KeyboardRemove,
    LabeledPrice, ParseMode, ReplyMarkup,
};
use tracing::{debug, error};
use crate::utils::errors::Result;

/// Keyboard attached to a reply
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Markup {
    /// Leave the current keyboard as it is
    #[default]
    None,
    /// Reply keyboard, one inner vector per row
    Keyboard(Vec<Vec<String>>),
    /// Hide the reply keyboard
    Remove,
}

/// A text message to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Markup,
    pub html: bool,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markup: Markup::None,
            html: false,
        }
    }

    pub fn keyboard(mut self, rows: Vec<Vec<String>>) -> Self {
        self.markup = Markup::Keyboard(rows);
        self
    }

    pub fn remove_keyboard(mut self) -> Self {
        self.markup = Markup::Remove;
        self
    }

    pub fn html(mut self) -> Self {
        self.html = true;
        self
    }

    /// Captions of every keyboard button, row by row
    pub fn buttons(&self) -> Vec<&str> {
        match &self.markup {
            Markup::Keyboard(rows) => rows.iter().flatten().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }
}

/// Invoice parameters for Telegram Payments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    pub payload: String,
    pub provider_token: String,
    pub currency: String,
    pub label: String,
    /// Minor units of `currency`
    pub amount: u32,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()>;

    async fn send_document(&self, chat_id: i64, path: &Path) -> Result<()>;

    /// Send images as one album with the caption on the first one
    async fn send_photos(&self, chat_id: i64, paths: &[PathBuf], caption: &str) -> Result<()>;

    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()>;
}

/// Send a reply, logging instead of failing when Telegram rejects it
pub async fn deliver(messenger: &dyn Messenger, chat_id: i64, reply: Reply) {
    if let Err(e) = messenger.send(chat_id, reply).await {
        error!(chat_id = chat_id, error = %e, "Failed to send message");
    }
}

/// Send a document, logging failures
pub async fn deliver_document(messenger: &dyn Messenger, chat_id: i64, path: &Path) {
    if let Err(e) = messenger.send_document(chat_id, path).await {
        error!(chat_id = chat_id, path = %path.display(), error = %e, "Failed to send document");
    }
}

/// `Messenger` backed by a teloxide bot
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn reply_markup(markup: Markup) -> Option<ReplyMarkup> {
        match markup {
            Markup::None => None,
            Markup::Keyboard(rows) => {
                let rows = rows
                    .into_iter()
                    .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>());
                Some(ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard()))
            }
            Markup::Remove => Some(ReplyMarkup::KeyboardRemove(KeyboardRemove::new())),
        }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, chat_id: i64, reply: Reply) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(chat_id), reply.text);
        if reply.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(markup) = Self::reply_markup(reply.markup) {
            request = request.reply_markup(markup);
        }
        request.await?;
        debug!(chat_id = chat_id, "Message sent");
        Ok(())
    }

    async fn send_document(&self, chat_id: i64, path: &Path) -> Result<()> {
        self.bot
            .send_document(ChatId(chat_id), InputFile::file(path.to_path_buf()))
            .await?;
        Ok(())
    }

    async fn send_photos(&self, chat_id: i64, paths: &[PathBuf], caption: &str) -> Result<()> {
        let media = paths.iter().enumerate().map(|(index, path)| {
            let photo = InputMediaPhoto::new(InputFile::file(path.clone()));
            if index == 0 {
                InputMedia::Photo(photo.caption(caption.to_string()))
            } else {
                InputMedia::Photo(photo)
            }
        });
        self.bot.send_media_group(ChatId(chat_id), media).await?;
        Ok(())
    }

    async fn send_invoice(&self, chat_id: i64, invoice: &Invoice) -> Result<()> {
        self.bot
            .send_invoice(
                ChatId(chat_id),
                invoice.title.clone(),
                invoice.description.clone(),
                invoice.payload.clone(),
                invoice.currency.clone(),
                vec![LabeledPrice::new(invoice.label.clone(), invoice.amount)],
            )
            .provider_token(invoice.provider_token.clone())
            .await?;
        Ok(())
    }
}
