use anyhow::{Context, Result};
use log::warn;
use std::path::PathBuf;

use crate::util::{load_registry, make_backend, save_registry};

pub fn exec(
    name: String,
    delete_snapshots: bool,
    config_dir: PathBuf,
    timeout_secs: u64,
    dry_run: bool,
) -> Result<()> {
    let mut registry = load_registry(&config_dir)?;
    let backend = make_backend(dry_run, timeout_secs);

    if delete_snapshots {
        let sub = registry.get_mut(&name)?;
        let cascade = sub.delete_all_snapshots(backend.as_ref());
        if cascade.is_ok() {
            // Пустой контейнер больше не нужен; неудача не мешает remove.
            let dir = sub.snapshot_dir();
            if let Err(e) = backend.delete(&dir) {
                warn!("{}: container {} not deleted: {}", name, dir.display(), e);
            }
        }
        if cascade.is_err() {
            // Частичный прогресс каскада сохраняется, остаток не теряется.
            if !dry_run {
                save_registry(&config_dir, &registry)?;
            }
            return cascade.with_context(|| format!("delete snapshots of '{}'", name));
        }
    }

    registry.remove(&name)?;

    if dry_run {
        println!("remove: dry-run, state not saved");
        return Ok(());
    }
    save_registry(&config_dir, &registry)?;
    if delete_snapshots {
        println!("remove: OK (subvolume='{}', snapshots deleted)", name);
    } else {
        println!("remove: OK (subvolume='{}', snapshots left on disk)", name);
    }
    Ok(())
}
