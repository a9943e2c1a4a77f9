//! Сабволюм: упорядоченная коллекция снапшотов + retention-настройки.
//!
//! Инварианты:
//! - snapshots отсортированы по created_at (возрастание), ничьи — в порядке
//!   вставки (движок гарантирует монотонные таймштампы между взятиями);
//! - counts ведутся инкрементально при append/удалении;
//! - имена снапшотов уникальны внутри сабволюма.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::Serialize;

use crate::backend::SubvolumeBackend;
use crate::consts::SNAPSHOT_DIR_NAME;
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use crate::tier::{KeepCounts, Tier, TierCounts};
use crate::util;

/// Зарегистрированный сабволюм.
#[derive(Debug, Clone)]
pub struct Subvolume {
    pub name: String,
    pub path: PathBuf,
    pub keep: KeepCounts,
    snapshots: Vec<Snapshot>,
    counts: TierCounts,
}

// Равенство между сабволюмами — по имени (уникальность в реестре,
// алфавитный листинг).
impl PartialEq for Subvolume {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
impl Eq for Subvolume {}

/// Строка позиционного листинга. Индекс не стабилен: после любого удаления
/// вызывающий перечитывает список.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotListEntry {
    pub index: usize,
    pub name: String,
    pub path: PathBuf,
}

impl Subvolume {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, keep: KeepCounts) -> Self {
        Subvolume {
            name: name.into(),
            path: path.into(),
            keep,
            snapshots: Vec::new(),
            counts: TierCounts::default(),
        }
    }

    /// Контейнер снапшотов: {path}/.snapshots (производный путь).
    pub fn snapshot_dir(&self) -> PathBuf {
        self.path.join(SNAPSHOT_DIR_NAME)
    }

    /// Есть ли сам сабволюм на диске (запрос к backend-у).
    pub fn is_physical(&self, backend: &dyn SubvolumeBackend) -> Result<bool> {
        backend.exists(&self.path)
    }

    pub fn snapshots(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn tier_count(&self, tier: Tier) -> u32 {
        self.counts.get(tier)
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Взять новый снапшот с уже назначенным тиром.
    ///
    /// Шаги: проверка физического существования сабволюма (NotPhysical),
    /// контейнер создаётся при отсутствии, имя — {name}-{timestamp} в
    /// секундном разрешении. Коллизия имени — DuplicateName, перезаписи не
    /// бывает. Мутация применяется только после успешного вызова backend-а.
    pub fn take_snapshot(
        &mut self,
        backend: &dyn SubvolumeBackend,
        now: NaiveDateTime,
        tier: Tier,
        read_only: bool,
    ) -> Result<&Snapshot> {
        if !backend.exists(&self.path)? {
            return Err(Error::NotPhysical {
                path: self.path.clone(),
            });
        }
        let dir = self.snapshot_dir();
        if !backend.exists(&dir)? {
            debug!("{}: creating snapshot container {}", self.name, dir.display());
            backend.create(&dir)?;
        }
        let name = util::snapshot_name(&self.name, now);
        if self.snapshots.iter().any(|s| s.name == name) {
            return Err(Error::DuplicateName { name });
        }
        let dest = dir.join(&name);
        backend.snapshot(&self.path, &dest, read_only)?;
        let snap = Snapshot {
            name,
            path: dest,
            tier,
            created_at: now,
            read_only,
        };
        debug!("{}: took {} snapshot {}", self.name, tier, snap.name);
        let idx = self.insert_sorted(snap);
        Ok(&self.snapshots[idx])
    }

    /// Зарегистрировать уже существующий снапшот (восстановление из
    /// state-файла). Backend не вызывается; физическое существование не
    /// проверяется, проверка ленивая, по запросу.
    pub fn append_existing_snapshot(&mut self, snap: Snapshot) {
        self.insert_sorted(snap);
    }

    fn insert_sorted(&mut self, snap: Snapshot) -> usize {
        let idx = self
            .snapshots
            .partition_point(|s| s.created_at <= snap.created_at);
        self.counts.inc(snap.tier);
        self.snapshots.insert(idx, snap);
        idx
    }

    /// Удалить снапшот по имени: сперва диск, потом коллекция.
    /// Отказ backend-а оставляет коллекцию нетронутой.
    pub fn delete_snapshot(
        &mut self,
        backend: &dyn SubvolumeBackend,
        name: &str,
    ) -> Result<Snapshot> {
        let idx = self
            .snapshots
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| Error::NotFound {
                what: "snapshot",
                name: name.to_string(),
            })?;
        self.snapshots[idx].delete(backend)?;
        let snap = self.snapshots.remove(idx);
        self.counts.dec(snap.tier);
        Ok(snap)
    }

    /// Каскад для remove: удаляет все снапшоты, старые вперёд.
    ///
    /// Снапшот, пропавший с диска, выкидывается из состояния с warn (лог
    /// фиксирует расхождение). Любой другой отказ прерывает каскад: остаток
    /// остаётся в состоянии и не теряется.
    pub fn delete_all_snapshots(&mut self, backend: &dyn SubvolumeBackend) -> Result<()> {
        let names: Vec<String> = self.snapshots.iter().map(|s| s.name.clone()).collect();
        for name in names {
            match self.delete_snapshot(backend, &name) {
                Ok(_) => {}
                Err(Error::NotPhysical { path }) => {
                    warn!(
                        "{}: snapshot {} missing on disk ({}), dropping from state",
                        self.name,
                        name,
                        path.display()
                    );
                    self.remove_entry(&name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    // Убрать запись без обращения к диску (объекта там уже нет).
    fn remove_entry(&mut self, name: &str) {
        if let Some(idx) = self.snapshots.iter().position(|s| s.name == name) {
            let snap = self.snapshots.remove(idx);
            self.counts.dec(snap.tier);
        }
    }

    /// Хронологически последний снапшот, опционально в пределах тира.
    pub fn newest(&self, tier: Option<Tier>) -> Result<&Snapshot> {
        self.snapshots
            .iter()
            .rev()
            .find(|s| tier.map_or(true, |t| s.tier == t))
            .ok_or_else(|| Error::Empty {
                name: self.name.clone(),
            })
    }

    /// Хронологически первый снапшот, опционально в пределах тира.
    pub fn oldest(&self, tier: Option<Tier>) -> Result<&Snapshot> {
        self.snapshots
            .iter()
            .find(|s| tier.map_or(true, |t| s.tier == t))
            .ok_or_else(|| Error::Empty {
                name: self.name.clone(),
            })
    }

    /// Позиционный листинг {index, name, path} поверх отсортированного вида.
    pub fn list_snapshots(&self) -> Vec<SnapshotListEntry> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(index, s)| SnapshotListEntry {
                index,
                name: s.name.clone(),
                path: s.path.clone(),
            })
            .collect()
    }
}
