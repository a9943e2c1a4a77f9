//! Типизированные ошибки движка.
//!
//! Классификация тиров ошибок не возвращает вовсе; prune собирает отказы
//! по отдельным снапшотам в отчёт прохода и не прерывается. Фатальны только
//! ошибки take (для одного сабволюма в рамках прохода) и ошибки состояния.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Операция адресует сабволюм или снапшот, которого нет на диске.
    #[error("{}: not a subvolume on the storage backend", path.display())]
    NotPhysical { path: PathBuf },

    /// Имя не зарегистрировано (в реестре или в коллекции снапшотов).
    #[error("{what} not found: {name}")]
    NotFound { what: &'static str, name: String },

    /// Повторная регистрация занятого имени. Состояние не меняется.
    #[error("duplicate name: {name}")]
    DuplicateName { name: String },

    /// Вызов backend-а упал или истёк таймаут; исход на диске неразрешён.
    #[error("backend unavailable ({} {}): {detail}", op, path.display())]
    BackendUnavailable {
        op: &'static str,
        path: PathBuf,
        detail: String,
    },

    /// newest/oldest по пустой (после фильтра) коллекции.
    #[error("no matching snapshots in subvolume {name}")]
    Empty { name: String },

    /// Повреждённый или несовместимый state-файл.
    #[error("state file {}: {detail}", path.display())]
    State { path: PathBuf, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn state(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Error::State {
            path: path.into(),
            detail: detail.into(),
        }
    }

    pub fn backend(op: &'static str, path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        Error::BackendUnavailable {
            op,
            path: path.into(),
            detail: detail.into(),
        }
    }
}
