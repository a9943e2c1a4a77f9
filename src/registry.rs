//! Реестр сабволюмов: упорядочен по имени, имена уникальны.
//!
//! Плюс мост между runtime-объектами и persisted-структурами state-файла:
//! загрузка идёт через append_existing_snapshot (восстановление без
//! обращений к диску), выгрузка — в отсортированные таблицы TOML.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::snapshot::Snapshot;
use crate::state::{self, SnapshotState, StateFile, SubvolumeState};
use crate::subvolume::Subvolume;

#[derive(Debug, Default)]
pub struct Registry {
    subvolumes: BTreeMap<String, Subvolume>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    pub fn len(&self) -> usize {
        self.subvolumes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subvolumes.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subvolumes.contains_key(name)
    }

    /// Зарегистрировать сабволюм. Занятое имя — DuplicateName, реестр
    /// не меняется.
    pub fn insert(&mut self, sub: Subvolume) -> Result<()> {
        match self.subvolumes.entry(sub.name.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateName { name: sub.name }),
            Entry::Vacant(e) => {
                e.insert(sub);
                Ok(())
            }
        }
    }

    pub fn get(&self, name: &str) -> Result<&Subvolume> {
        self.subvolumes.get(name).ok_or_else(|| Error::NotFound {
            what: "subvolume",
            name: name.to_string(),
        })
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Subvolume> {
        self.subvolumes.get_mut(name).ok_or_else(|| Error::NotFound {
            what: "subvolume",
            name: name.to_string(),
        })
    }

    pub fn remove(&mut self, name: &str) -> Result<Subvolume> {
        self.subvolumes.remove(name).ok_or_else(|| Error::NotFound {
            what: "subvolume",
            name: name.to_string(),
        })
    }

    /// Итерация в алфавитном порядке имён.
    pub fn iter(&self) -> impl Iterator<Item = &Subvolume> {
        self.subvolumes.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Subvolume> {
        self.subvolumes.values_mut()
    }

    // ---- Мост к persisted-состоянию ----

    /// Восстановить реестр из persisted-структур.
    ///
    /// Каждый снапшот проходит через append_existing_snapshot: порядок в
    /// файле не важен, коллекция соберётся отсортированной, счётчики тиров
    /// пересчитаются. Дубликат имени в файле — ошибка, файл повреждён.
    pub fn from_state(state: StateFile) -> Result<Registry> {
        let mut reg = Registry::new();
        for (key, sub_state) in state.subvolumes {
            state::check_key_matches_name(&key, &sub_state);
            let mut sub = Subvolume::new(sub_state.name, sub_state.path, sub_state.keep);
            for s in sub_state.snapshots {
                sub.append_existing_snapshot(Snapshot {
                    name: s.name,
                    path: s.path,
                    tier: s.tier,
                    created_at: s.created_at,
                    read_only: s.read_only,
                });
            }
            reg.insert(sub)?;
        }
        Ok(reg)
    }

    /// Выгрузить реестр в persisted-структуры (ключ таблицы — имя).
    pub fn to_state(&self) -> StateFile {
        let mut subvolumes = BTreeMap::new();
        for sub in self.iter() {
            let snapshots = sub
                .snapshots()
                .iter()
                .map(|s| SnapshotState {
                    name: s.name.clone(),
                    path: s.path.clone(),
                    tier: s.tier,
                    created_at: s.created_at,
                    read_only: s.read_only,
                })
                .collect();
            subvolumes.insert(
                sub.name.clone(),
                SubvolumeState {
                    name: sub.name.clone(),
                    path: sub.path.clone(),
                    keep: sub.keep,
                    snapshots,
                },
            );
        }
        StateFile {
            version: crate::consts::STATE_VERSION,
            subvolumes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tier::{KeepCounts, Tier};
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn sub(name: &str) -> Subvolume {
        Subvolume::new(name, format!("/{name}"), KeepCounts::default())
    }

    #[test]
    fn insert_duplicate_fails_and_keeps_registry() {
        let mut reg = Registry::new();
        reg.insert(sub("home")).unwrap();
        let err = reg.insert(sub("home")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn iteration_is_alphabetical() {
        let mut reg = Registry::new();
        reg.insert(sub("var")).unwrap();
        reg.insert(sub("etc")).unwrap();
        reg.insert(sub("home")).unwrap();
        let names: Vec<&str> = reg.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["etc", "home", "var"]);
    }

    #[test]
    fn get_and_remove_unknown_are_not_found() {
        let mut reg = Registry::new();
        assert!(matches!(reg.get("nope"), Err(Error::NotFound { .. })));
        assert!(matches!(reg.remove("nope"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn state_roundtrip_keeps_order_and_tiers() {
        let mut reg = Registry::new();
        let mut s = sub("data");
        let d1 = NaiveDate::from_ymd_opt(2021, 3, 14)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let d2 = NaiveDate::from_ymd_opt(2021, 3, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        s.append_existing_snapshot(Snapshot {
            name: "data-b".into(),
            path: PathBuf::from("/data/.snapshots/data-b"),
            tier: Tier::Weekly,
            created_at: d2,
            read_only: true,
        });
        s.append_existing_snapshot(Snapshot {
            name: "data-a".into(),
            path: PathBuf::from("/data/.snapshots/data-a"),
            tier: Tier::Init,
            created_at: d1,
            read_only: true,
        });
        reg.insert(s).unwrap();

        let back = Registry::from_state(reg.to_state()).unwrap();
        let restored = back.get("data").unwrap();
        let names: Vec<&str> = restored.snapshots().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["data-a", "data-b"]);
        assert_eq!(restored.snapshots()[0].tier, Tier::Init);
        assert_eq!(restored.snapshots()[1].tier, Tier::Weekly);
        assert_eq!(restored.tier_count(Tier::Init), 1);
        assert_eq!(restored.tier_count(Tier::Weekly), 1);
    }
}
