//! In-memory бэкенд для тестов и --dry-run.
//!
//! Хранит множество «существующих» сабволюмов и журнал команд. Умеет
//! инжектировать отказ delete по пути и полную недоступность. В режиме
//! dry-run (assume_exists + echo) печатает команды вместо выполнения.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::backend::SubvolumeBackend;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    subvols: BTreeSet<PathBuf>,
    commands: Vec<String>,
    fail_delete: BTreeSet<PathBuf>,
    unavailable: bool,
}

#[derive(Debug, Default)]
pub struct MockBackend {
    inner: Mutex<Inner>,
    /// exists() всегда true: dry-run не должен спотыкаться о несозданное.
    assume_exists: bool,
    /// Печатать команды на stdout (режим --dry-run).
    echo: bool,
}

impl MockBackend {
    pub fn new() -> Self {
        MockBackend::default()
    }

    /// Бэкенд для --dry-run: всё «существует», команды печатаются.
    pub fn dry_run() -> Self {
        MockBackend {
            inner: Mutex::new(Inner::default()),
            assume_exists: true,
            echo: true,
        }
    }

    pub fn with_subvolume(self, path: impl Into<PathBuf>) -> Self {
        self.add_subvolume(path);
        self
    }

    pub fn add_subvolume(&self, path: impl Into<PathBuf>) {
        self.lock().subvols.insert(path.into());
    }

    /// Все последующие delete по этому пути будут отказывать.
    pub fn fail_delete_of(&self, path: impl Into<PathBuf>) {
        self.lock().fail_delete.insert(path.into());
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Журнал выполненных команд (включая отказавшие).
    pub fn commands(&self) -> Vec<String> {
        self.lock().commands.clone()
    }

    pub fn has_subvolume(&self, path: &Path) -> bool {
        self.lock().subvols.contains(path)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, line: String) -> String {
        let mut inner = self.lock();
        inner.commands.push(line.clone());
        drop(inner);
        if self.echo {
            println!("{}", line);
        }
        line
    }

    fn check_available(&self, op: &'static str, path: &Path) -> Result<()> {
        if self.lock().unavailable {
            return Err(Error::backend(op, path, "injected: backend unavailable"));
        }
        Ok(())
    }
}

impl SubvolumeBackend for MockBackend {
    fn exists(&self, path: &Path) -> Result<bool> {
        self.check_available("show", path)?;
        if self.assume_exists {
            return Ok(true);
        }
        Ok(self.lock().subvols.contains(path))
    }

    fn create(&self, path: &Path) -> Result<()> {
        self.check_available("create", path)?;
        self.record(format!("btrfs subvolume create {}", path.display()));
        self.lock().subvols.insert(path.to_path_buf());
        Ok(())
    }

    fn delete(&self, path: &Path) -> Result<()> {
        self.check_available("delete", path)?;
        self.record(format!("btrfs subvolume delete {}", path.display()));
        if self.lock().fail_delete.contains(path) {
            return Err(Error::backend("delete", path, "injected: delete failure"));
        }
        if self.assume_exists {
            return Ok(());
        }
        if !self.lock().subvols.remove(path) {
            return Err(Error::backend("delete", path, "no such subvolume"));
        }
        Ok(())
    }

    fn snapshot(&self, source: &Path, dest: &Path, read_only: bool) -> Result<()> {
        self.check_available("snapshot", dest)?;
        let ro = if read_only { "-r " } else { "" };
        self.record(format!(
            "btrfs subvolume snapshot {}{} {}",
            ro,
            source.display(),
            dest.display()
        ));
        if !self.assume_exists && !self.lock().subvols.contains(source) {
            return Err(Error::backend("snapshot", source, "no such subvolume"));
        }
        self.lock().subvols.insert(dest.to_path_buf());
        Ok(())
    }

    fn send_diff(&self, old: &Path, new: Option<&Path>, sink: &mut dyn Write) -> Result<u64> {
        let target = new.unwrap_or(old);
        self.check_available("send", target)?;
        let line = match new {
            Some(new) => self.record(format!(
                "btrfs send -p {} {}",
                old.display(),
                new.display()
            )),
            None => self.record(format!("btrfs send {}", old.display())),
        };
        let payload = format!("{}\n", line);
        sink.write_all(payload.as_bytes())?;
        Ok(payload.len() as u64)
    }
}
