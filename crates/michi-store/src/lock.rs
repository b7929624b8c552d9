//! Advisory lock serializing read-modify-write cycles on the state file

use crate::StoreError;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Exclusive lock held for as long as the guard lives
pub struct StateLock {
    file: File,
    path: PathBuf,
}

impl StateLock {
    /// Block until the exclusive lock on `path` is acquired
    pub fn acquire(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .read(true)
            .open(path)?;

        file.lock_exclusive().map_err(|source| StoreError::Lock {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Acquired state lock {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!("Released state lock {}", self.path.display());
    }
}
