//! File-based locking for single-instance safety.
//!
//! Cross-platform (fs2) advisory lock, exclusive only: одновременно с
//! config-dir работает один snapkeep. Без ожидания — занятый лок это
//! немедленный отказ, а не зависание.
//!
//! Lock file path: <config-dir>/snapkeep.lock
//! Lock is released on Drop.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::consts::LOCK_FILE;
use crate::error::Result;

pub struct LockGuard {
    file: std::fs::File,
    path: PathBuf,
}

impl LockGuard {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // fs2 unlock errors on drop are ignored deliberately.
        let _ = self.file.unlock();
    }
}

fn lock_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(LOCK_FILE)
}

fn open_lock_file(config_dir: &Path) -> Result<std::fs::File> {
    fs::create_dir_all(config_dir)?;
    let f = OpenOptions::new()
        .create(true)
        .read(true)
        .write(true)
        .open(lock_file_path(config_dir))?;
    Ok(f)
}

/// Try to acquire the exclusive lock. Returns Err if already locked.
pub fn try_acquire_exclusive(config_dir: &Path) -> Result<LockGuard> {
    let file = open_lock_file(config_dir)?;
    file.try_lock_exclusive()?;
    let path = lock_file_path(config_dir);
    debug!("acquired exclusive lock {}", path.display());
    Ok(LockGuard { file, path })
}
