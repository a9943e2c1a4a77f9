use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::util::{load_registry, make_backend, resolve_snapshot_arg, save_registry};

pub fn exec(
    name: String,
    snapshot: String,
    config_dir: PathBuf,
    timeout_secs: u64,
    dry_run: bool,
) -> Result<()> {
    let mut registry = load_registry(&config_dir)?;
    let backend = make_backend(dry_run, timeout_secs);

    let sub = registry.get_mut(&name)?;
    let resolved = resolve_snapshot_arg(sub, &snapshot)?;
    sub.delete_snapshot(backend.as_ref(), &resolved)
        .with_context(|| format!("delete snapshot '{}' of '{}'", resolved, name))?;

    if dry_run {
        println!("delete-snapshot: dry-run, state not saved");
        return Ok(());
    }
    save_registry(&config_dir, &registry)?;
    println!(
        "delete-snapshot: OK (subvolume='{}', snapshot='{}')",
        name, resolved
    );
    Ok(())
}
