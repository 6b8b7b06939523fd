//! Keystore persistence backends

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use crate::error::KeyStoreError;

/// Where a keystore document lives
pub trait Store: Send + Sync {
    /// Read the stored document, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<String>, KeyStoreError>;

    /// Replace the stored document
    fn save(&self, contents: &str) -> Result<(), KeyStoreError>;

    /// Remove the stored document
    fn clear(&self) -> Result<(), KeyStoreError>;
}

/// A keystore document on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Option<String>, KeyStoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&self.path)?))
    }

    fn save(&self, contents: &str) -> Result<(), KeyStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Owner read/write only
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)?;
            file.write_all(contents.as_bytes())?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)?;
        }

        debug!("Saved keystore to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), KeyStoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// An in-process keystore document
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, KeyStoreError> {
        self.contents
            .lock()
            .map_err(|_| KeyStoreError::Corrupted("memory store lock poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<String>, KeyStoreError> {
        Ok(self.slot()?.clone())
    }

    fn save(&self, contents: &str) -> Result<(), KeyStoreError> {
        *self.slot()? = Some(contents.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), KeyStoreError> {
        *self.slot()? = None;
        Ok(())
    }
}
