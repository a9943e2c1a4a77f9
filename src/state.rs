//! Persisted-состояние: <config-dir>/snapkeep.toml (+ defaults, + .bak).
//!
//! Формат (TOML, versioned):
//!
//! version = 1
//! [subvolumes.home]
//! name = "home"
//! path = "/home"
//! [subvolumes.home.keep]
//! hourly = 10
//! daily = 10
//! weekly = 0
//! monthly = 10
//! yearly = 10
//! [[subvolumes.home.snapshots]]
//! name = "home-2021-03-14T10:00:00"
//! path = "/home/.snapshots/home-2021-03-14T10:00:00"
//! tier = "init"
//! created_at = "2021-03-14T10:00:00"
//! read_only = true
//!
//! Политика:
//! - Атомарная запись: tmp+rename, затем fsync родительского каталога
//!   (best-effort вне unix).
//! - Перед заменой предыдущий файл копируется в snapkeep.toml.bak.
//! - Отсутствующий файл — пустое состояние, не ошибка.
//! - Несовпадение version — ошибка State, молчаливых миграций нет.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
#[cfg(unix)]
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULTS_FILE, STATE_BAK_SUFFIX, STATE_FILE, STATE_TMP_SUFFIX, STATE_VERSION,
};
use crate::error::{Error, Result};
use crate::tier::{KeepCounts, Tier};

// ---- Persisted-структуры ----

fn default_true() -> bool {
    true
}

fn default_version() -> u32 {
    STATE_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotState {
    pub name: String,
    pub path: PathBuf,
    pub tier: Tier,
    pub created_at: NaiveDateTime,
    #[serde(default = "default_true")]
    pub read_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubvolumeState {
    pub name: String,
    pub path: PathBuf,
    #[serde(default)]
    pub keep: KeepCounts,
    #[serde(default)]
    pub snapshots: Vec<SnapshotState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFile {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub subvolumes: BTreeMap<String, SubvolumeState>,
}

impl Default for StateFile {
    fn default() -> Self {
        StateFile {
            version: STATE_VERSION,
            subvolumes: BTreeMap::new(),
        }
    }
}

// ---- Пути ----

#[inline]
pub fn state_path(config_dir: &Path) -> PathBuf {
    config_dir.join(STATE_FILE)
}

#[inline]
pub fn defaults_path(config_dir: &Path) -> PathBuf {
    config_dir.join(DEFAULTS_FILE)
}

fn bak_path(config_dir: &Path) -> PathBuf {
    config_dir.join(format!("{}.{}", STATE_FILE, STATE_BAK_SUFFIX))
}

fn tmp_path(config_dir: &Path) -> PathBuf {
    config_dir.join(format!("{}.{}", STATE_FILE, STATE_TMP_SUFFIX))
}

#[cfg(unix)]
fn fsync_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let dir = File::open(parent)?;
            dir.sync_all()?;
        }
    }
    Ok(())
}
#[cfg(not(unix))]
fn fsync_dir(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

// ---- Загрузка/сохранение ----

/// Прочитать state-файл. Отсутствие файла — пустое состояние.
pub fn load_state(config_dir: &Path) -> Result<StateFile> {
    let path = state_path(config_dir);
    let body = match fs::read_to_string(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("no state file at {}, starting empty", path.display());
            return Ok(StateFile::default());
        }
        Err(e) => return Err(e.into()),
    };
    let state: StateFile =
        toml::from_str(&body).map_err(|e| Error::state(&path, e.to_string()))?;
    if state.version != STATE_VERSION {
        return Err(Error::state(
            &path,
            format!(
                "unsupported version {} (expected {})",
                state.version, STATE_VERSION
            ),
        ));
    }
    debug!(
        "loaded state {} ({} subvolumes)",
        path.display(),
        state.subvolumes.len()
    );
    Ok(state)
}

/// Записать state-файл атомарно, с .bak-копией предыдущего.
pub fn save_state(config_dir: &Path, state: &StateFile) -> Result<()> {
    fs::create_dir_all(config_dir)?;
    let path = state_path(config_dir);
    let body =
        toml::to_string_pretty(state).map_err(|e| Error::state(&path, e.to_string()))?;

    if path.exists() {
        fs::copy(&path, bak_path(config_dir))?;
    }

    let tmp = tmp_path(config_dir);
    let _ = fs::remove_file(&tmp); // best-effort

    let mut f = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&tmp)?;
    f.write_all(body.as_bytes())?;
    f.sync_all()?; // flush tmp to disk

    fs::rename(&tmp, &path)?;
    let _ = fsync_dir(&path);
    debug!(
        "saved state {} ({} subvolumes)",
        path.display(),
        state.subvolumes.len()
    );
    Ok(())
}

/// Keep-дефолты для init: snapkeep-default.toml либо встроенные значения.
///
/// Отсутствие файла — норма (лог и builtin-ы); повреждённый файл — ошибка,
/// молча подменять настройки администратора нельзя.
pub fn load_defaults(config_dir: &Path) -> Result<KeepCounts> {
    let path = defaults_path(config_dir);
    let body = match fs::read_to_string(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(
                "defaults file {} missing, using built-in keep counts",
                path.display()
            );
            return Ok(KeepCounts::default());
        }
        Err(e) => return Err(e.into()),
    };
    let keep: KeepCounts =
        toml::from_str(&body).map_err(|e| Error::state(&path, e.to_string()))?;
    debug!("loaded defaults {} ({})", path.display(), keep);
    Ok(keep)
}

// Снапшот с невалидным тиром в файле ловится на уровне serde (enum),
// отдельной проверки не нужно; warn ниже — для расхождения ключа и имени.
pub(crate) fn check_key_matches_name(key: &str, state: &SubvolumeState) {
    if key != state.name {
        warn!(
            "state: table key {:?} differs from subvolume name {:?}, trusting the name field",
            key, state.name
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_state() -> StateFile {
        let mut subvolumes = BTreeMap::new();
        subvolumes.insert(
            "home".to_string(),
            SubvolumeState {
                name: "home".to_string(),
                path: PathBuf::from("/home"),
                keep: KeepCounts::default(),
                snapshots: vec![SnapshotState {
                    name: "home-2021-03-14T10:00:00".to_string(),
                    path: PathBuf::from("/home/.snapshots/home-2021-03-14T10:00:00"),
                    tier: Tier::Init,
                    created_at: NaiveDate::from_ymd_opt(2021, 3, 14)
                        .unwrap()
                        .and_hms_opt(10, 0, 0)
                        .unwrap(),
                    read_only: true,
                }],
            },
        );
        StateFile {
            version: STATE_VERSION,
            subvolumes,
        }
    }

    #[test]
    fn toml_roundtrip_preserves_contents() {
        let state = sample_state();
        let body = toml::to_string_pretty(&state).unwrap();
        let back: StateFile = toml::from_str(&body).unwrap();
        assert_eq!(back.version, STATE_VERSION);
        let sub = &back.subvolumes["home"];
        assert_eq!(sub.name, "home");
        assert_eq!(sub.snapshots.len(), 1);
        assert_eq!(sub.snapshots[0].tier, Tier::Init);
        assert!(sub.snapshots[0].read_only);
        assert_eq!(
            sub.snapshots[0].created_at,
            NaiveDate::from_ymd_opt(2021, 3, 14)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn read_only_defaults_to_true() {
        let body = r#"
version = 1
[subvolumes.data]
name = "data"
path = "/data"
[[subvolumes.data.snapshots]]
name = "data-2021-03-14T10:00:00"
path = "/data/.snapshots/data-2021-03-14T10:00:00"
tier = "hourly"
created_at = "2021-03-14T10:00:00"
"#;
        let state: StateFile = toml::from_str(body).unwrap();
        assert!(state.subvolumes["data"].snapshots[0].read_only);
    }

    #[test]
    fn missing_keep_table_uses_defaults() {
        let body = "version = 1\n[subvolumes.data]\nname = \"data\"\npath = \"/data\"\n";
        let state: StateFile = toml::from_str(body).unwrap();
        assert_eq!(state.subvolumes["data"].keep, KeepCounts::default());
        assert!(state.subvolumes["data"].snapshots.is_empty());
    }
}
