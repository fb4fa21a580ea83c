//! Storage of applicant documents received through Telegram

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use crate::utils::errors::Result;
use crate::utils::helpers::generate_file_name;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Download a Telegram file and return where it was written
    async fn save(&self, file_id: &str) -> Result<PathBuf>;

    async fn remove(&self, path: &Path) -> Result<()>;
}

/// Downloads files with the bot that received them
#[derive(Clone)]
pub struct TelegramFileStore {
    bot: Bot,
    documents_dir: PathBuf,
}

impl TelegramFileStore {
    pub fn new(bot: Bot, documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            bot,
            documents_dir: documents_dir.into(),
        }
    }
}

#[async_trait]
impl FileStore for TelegramFileStore {
    async fn save(&self, file_id: &str) -> Result<PathBuf> {
        let file = self.bot.get_file(file_id.to_string()).await?;

        fs::create_dir_all(&self.documents_dir).await?;
        let destination = self.documents_dir.join(generate_file_name(&file.path));

        let mut output = fs::File::create(&destination).await?;
        if let Err(e) = self.bot.download_file(&file.path, &mut output).await {
            drop(output);
            if let Err(cleanup) = fs::remove_file(&destination).await {
                warn!(path = %destination.display(), error = %cleanup, "Failed to remove partial download");
            }
            return Err(e.into());
        }
        output.flush().await?;

        info!(path = %destination.display(), size = file.size, "Saved uploaded document");
        Ok(destination)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        fs::remove_file(path).await?;
        Ok(())
    }
}
