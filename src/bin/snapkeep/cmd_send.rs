use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::path::PathBuf;

use Snapkeep::consts::DEFAULT_BACKEND_TIMEOUT_SECS;
use Snapkeep::snapshot::Snapshot;
use Snapkeep::subvolume::Subvolume;

use crate::util::{load_registry, make_backend, resolve_snapshot_arg};

fn find<'a>(sub: &'a Subvolume, name: &str) -> Result<&'a Snapshot> {
    sub.snapshots()
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| anyhow!("{}: no snapshot named '{}'", sub.name, name))
}

pub fn exec(
    name: String,
    snapshot: String,
    parent: Option<String>,
    out: Option<PathBuf>,
    config_dir: PathBuf,
) -> Result<()> {
    let registry = load_registry(&config_dir)?;
    let sub = registry.get(&name)?;

    let snap = find(sub, &resolve_snapshot_arg(sub, &snapshot)?)?;
    let parent = match parent {
        Some(arg) => Some(find(sub, &resolve_snapshot_arg(sub, &arg)?)?),
        None => None,
    };

    // Дефолтное имя файла кодирует пару: <parent|init>::<snapshot>.
    let out = out.unwrap_or_else(|| {
        let stem = match parent {
            Some(p) => format!("{}::{}", p.name, snap.name),
            None => format!("init::{}", snap.name),
        };
        std::env::temp_dir().join(stem)
    });
    let mut file =
        File::create(&out).with_context(|| format!("create output file {}", out.display()))?;

    let backend = make_backend(false, DEFAULT_BACKEND_TIMEOUT_SECS);
    let bytes = match parent {
        Some(p) => backend.send_diff(&p.path, Some(&snap.path), &mut file),
        None => backend.send_diff(&snap.path, None, &mut file),
    }
    .with_context(|| format!("send snapshot '{}'", snap.name))?;

    println!("send: OK ({} bytes -> {})", bytes, out.display());
    Ok(())
}
