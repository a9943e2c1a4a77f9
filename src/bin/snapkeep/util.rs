use anyhow::{anyhow, Context, Result};
use std::path::Path;
use std::time::Duration;

use Snapkeep::backend::{BtrfsBackend, MockBackend, SubvolumeBackend};
use Snapkeep::registry::Registry;
use Snapkeep::state;
use Snapkeep::subvolume::Subvolume;

/// Реестр из snapkeep.toml; отсутствующий файл — пустой реестр.
pub fn load_registry(config_dir: &Path) -> Result<Registry> {
    let file = state::load_state(config_dir)
        .with_context(|| format!("load state from {}", config_dir.display()))?;
    let reg = Registry::from_state(file)?;
    Ok(reg)
}

pub fn save_registry(config_dir: &Path, registry: &Registry) -> Result<()> {
    state::save_state(config_dir, &registry.to_state())
        .with_context(|| format!("save state to {}", config_dir.display()))
}

/// Боевой btrfs, либо echo-mock для --dry-run.
pub fn make_backend(dry_run: bool, timeout_secs: u64) -> Box<dyn SubvolumeBackend> {
    if dry_run {
        Box::new(MockBackend::dry_run())
    } else {
        Box::new(BtrfsBackend::new(Duration::from_secs(timeout_secs)))
    }
}

/// Аргумент --snapshot: имя, либо индекс из сортированного листинга.
/// Индекс валиден только против текущего листинга (после удалений он
/// сдвигается, вызывающий перечитывает).
pub fn resolve_snapshot_arg(sub: &Subvolume, arg: &str) -> Result<String> {
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_digit()) {
        let idx: usize = arg.parse()?;
        let listing = sub.list_snapshots();
        let entry = listing
            .into_iter()
            .find(|e| e.index == idx)
            .ok_or_else(|| anyhow!("{}: no snapshot at index {}", sub.name, idx))?;
        return Ok(entry.name);
    }
    Ok(arg.to_string())
}
