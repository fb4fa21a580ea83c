//! `FileStore` writing placeholder files into a temporary directory

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use async_trait::async_trait;
use ac_signup::services::FileStore;
use ac_signup::utils::errors::{Result, SignupError};

pub struct FakeFileStore {
    dir: PathBuf,
    removed: Mutex<Vec<PathBuf>>,
    fail: AtomicBool,
}

impl FakeFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            removed: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every download fail
    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn path_for(&self, file_id: &str) -> PathBuf {
        self.dir.join(format!("{}.jpg", file_id))
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn save(&self, file_id: &str) -> Result<PathBuf> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SignupError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "download interrupted",
            )));
        }
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(file_id);
        tokio::fs::write(&path, file_id.as_bytes()).await?;
        Ok(path)
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        self.removed.lock().unwrap().push(path.to_path_buf());
        tokio::fs::remove_file(path).await?;
        Ok(())
    }
}
