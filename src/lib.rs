#![allow(non_snake_case)]

// Базовые модули
pub mod consts;
pub mod error;
pub mod metrics;
pub mod tier;

// Модель данных
pub mod snapshot;
pub mod subvolume;
pub mod registry;

// Ротация (гейт, классификация, prune, проход)
pub mod retention;
pub mod rotation;

// Хранилище состояния и блокировка
pub mod state;
pub mod lock;

// Бэкенды (btrfs subprocess / in-memory mock)
pub mod backend; // src/backend/{mod,btrfs,mock}.rs

// Утилиты (now_local, форматы имён)
pub mod util; // src/util/mod.rs

// Удобные реэкспорты
pub use backend::{BtrfsBackend, MockBackend, SubvolumeBackend};
pub use error::{Error, Result};
pub use registry::Registry;
pub use rotation::{run_pass, PassReport, SubvolumeReport};
pub use snapshot::Snapshot;
pub use subvolume::{SnapshotListEntry, Subvolume};
pub use tier::{KeepCounts, Tier};
