use anyhow::{anyhow, Result};
use std::path::PathBuf;

use crate::cli::KeepArgs;
use crate::util::{load_registry, save_registry};

pub fn exec(name: String, keep: KeepArgs, config_dir: PathBuf) -> Result<()> {
    if keep.is_empty() {
        return Err(anyhow!("provide at least one --keep-* flag"));
    }

    let mut registry = load_registry(&config_dir)?;
    let sub = registry.get_mut(&name)?;
    if let Some(v) = keep.keep_hourly {
        sub.keep.hourly = v;
    }
    if let Some(v) = keep.keep_daily {
        sub.keep.daily = v;
    }
    if let Some(v) = keep.keep_weekly {
        sub.keep.weekly = v;
    }
    if let Some(v) = keep.keep_monthly {
        sub.keep.monthly = v;
    }
    if let Some(v) = keep.keep_yearly {
        sub.keep.yearly = v;
    }
    let applied = sub.keep;

    save_registry(&config_dir, &registry)?;
    // Лишние снапшоты уйдут на следующем rotate.
    println!("set-keep: OK (subvolume='{}', keep={})", name, applied);
    Ok(())
}
