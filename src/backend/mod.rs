//! Storage capability — граница между моделью и реальным хранилищем.
//!
//! Всё общее поведение сабволюмов и снапшотов (существование, создание,
//! удаление, взятие снапшота, выгрузка diff-потока) живёт за этим трейтом.
//! Модель не знает, говорит она с btrfs или с in-memory моком; реализация
//! подставляется вызывающей стороной.

use std::io::Write;
use std::path::Path;

use crate::error::Result;

mod btrfs;
mod mock;

pub use btrfs::BtrfsBackend;
pub use mock::MockBackend;

/// Интерфейс хранилища. Объектно-безопасный: модель держит `&dyn`.
///
/// Каждый метод возвращает успех либо ошибку с диагностикой backend-а.
/// Таймаут или недоступность — `Error::BackendUnavailable`; в этом случае
/// исход операции на диске считается неразрешённым.
pub trait SubvolumeBackend {
    /// Существует ли сабволюм по пути. Чистый запрос, состояние не меняет.
    fn exists(&self, path: &Path) -> Result<bool>;

    /// Создать пустой сабволюм (контейнер снапшотов).
    fn create(&self, path: &Path) -> Result<()>;

    /// Удалить сабволюм/снапшот по пути.
    fn delete(&self, path: &Path) -> Result<()>;

    /// Взять снапшот source -> dest, опционально read-only.
    fn snapshot(&self, source: &Path, dest: &Path, read_only: bool) -> Result<()>;

    /// Выгрузить поток переноса: полный для `old` (new = None) либо
    /// инкрементальный от `old` к `new`. Возвращает число записанных байт;
    /// потребление потока (файл, аплоад) — забота вызывающего.
    fn send_diff(&self, old: &Path, new: Option<&Path>, sink: &mut dyn Write) -> Result<u64>;
}
