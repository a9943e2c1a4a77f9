use anyhow::{anyhow, Context, Result};
use std::path::PathBuf;

use Snapkeep::state;
use Snapkeep::subvolume::Subvolume;
use Snapkeep::tier::{KeepCounts, Tier};
use Snapkeep::util::now_local;

use crate::cli::KeepArgs;
use crate::util::{load_registry, make_backend, save_registry};

pub fn exec(
    path: PathBuf,
    keep: KeepArgs,
    config_dir: PathBuf,
    timeout_secs: u64,
    dry_run: bool,
) -> Result<()> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow!("cannot derive a subvolume name from {}", path.display()))?;

    let mut registry = load_registry(&config_dir)?;
    if registry.contains(&name) {
        return Err(anyhow!("subvolume '{}' is already tracked", name));
    }

    // Дефолты из snapkeep-default.toml, поверх — флаги.
    let defaults = state::load_defaults(&config_dir)?;
    let counts = KeepCounts {
        hourly: keep.keep_hourly.unwrap_or(defaults.hourly),
        daily: keep.keep_daily.unwrap_or(defaults.daily),
        weekly: keep.keep_weekly.unwrap_or(defaults.weekly),
        monthly: keep.keep_monthly.unwrap_or(defaults.monthly),
        yearly: keep.keep_yearly.unwrap_or(defaults.yearly),
    };

    let backend = make_backend(dry_run, timeout_secs);
    let mut sub = Subvolume::new(name.clone(), path, counts);
    let snap_name = sub
        .take_snapshot(backend.as_ref(), now_local(), Tier::Init, true)
        .with_context(|| format!("take initial snapshot of '{}'", name))?
        .name
        .clone();
    registry.insert(sub)?;

    if dry_run {
        println!("init: dry-run, state not saved");
        return Ok(());
    }
    save_registry(&config_dir, &registry)?;
    println!("init: OK (subvolume='{}', snapshot='{}')", name, snap_name);
    Ok(())
}
