//! Durable storage for the cart mirror

use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use crate::models::Cart;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mirror file I/O failed")]
    Io(#[from] std::io::Error),

    #[error("mirror file is not a valid cart")]
    Format(#[from] serde_json::Error),
}

/// Where the mirror keeps its copy between sessions.
#[async_trait]
pub trait MirrorStorage: Send + Sync {
    /// `None` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Cart>, StorageError>;

    async fn save(&self, cart: &Cart) -> Result<(), StorageError>;
}

/// Stores the cart as a JSON file.
///
/// Writes go to a sibling temp file which is then renamed over the
/// target, so a crash mid-write leaves the previous copy intact.
#[derive(Debug, Clone)]
pub struct FileMirrorStorage {
    path: PathBuf,
}

impl FileMirrorStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");

        self.path.with_file_name(name)
    }
}

#[async_trait]
impl MirrorStorage for FileMirrorStorage {
    async fn load(&self) -> Result<Option<Cart>, StorageError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(cart)?;
        let temp = self.temp_path();

        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), items = cart.items.len(), "saved cart mirror");

        Ok(())
    }
}

/// Keeps the cart in memory only.
#[derive(Debug, Default)]
pub struct MemoryMirrorStorage {
    cart: Mutex<Option<Cart>>,
}

impl MemoryMirrorStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MirrorStorage for MemoryMirrorStorage {
    async fn load(&self) -> Result<Option<Cart>, StorageError> {
        Ok(self.cart.lock().await.clone())
    }

    async fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        *self.cart.lock().await = Some(cart.clone());

        Ok(())
    }
}
