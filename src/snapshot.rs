//! Снапшот: именованная точка во времени одного сабволюма.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use log::debug;

use crate::backend::SubvolumeBackend;
use crate::error::{Error, Result};
use crate::tier::Tier;

/// Один снапшот.
///
/// created_at назначается однажды при создании и не меняется. Принадлежность
/// сабволюму выражена путём: контейнер снапшотов лежит внутри сабволюма.
/// Равенство полное по полям; упорядочение коллекции (created_at по
/// возрастанию, ничьи в порядке вставки) поддерживает владелец, см. Subvolume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    pub path: PathBuf,
    pub tier: Tier,
    pub created_at: NaiveDateTime,
    pub read_only: bool,
}

impl Snapshot {
    /// Есть ли объект на диске. Чистый запрос, состояние не меняет.
    /// Отказ backend-а — BackendUnavailable: существование неизвестно,
    /// считать false нельзя.
    pub fn exists(&self, backend: &dyn SubvolumeBackend) -> Result<bool> {
        backend.exists(&self.path)
    }

    /// Удалить с диска. NotPhysical, если объекта там нет.
    ///
    /// Порядок фиксированный: сперва диск, потом владелец убирает запись из
    /// коллекции. При отказе backend-а снапшот остаётся как был, частичных
    /// удалений не бывает.
    pub fn delete(&self, backend: &dyn SubvolumeBackend) -> Result<()> {
        if !self.exists(backend)? {
            return Err(Error::NotPhysical {
                path: self.path.clone(),
            });
        }
        backend.delete(&self.path)?;
        debug!("deleted snapshot {} ({})", self.name, self.path.display());
        Ok(())
    }
}
