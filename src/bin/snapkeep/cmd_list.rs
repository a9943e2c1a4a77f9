use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use crate::util::load_registry;

#[derive(Serialize)]
struct Row {
    name: String,
    path: String,
    snapshots: usize,
}

pub fn exec(config_dir: PathBuf, json: bool) -> Result<()> {
    let registry = load_registry(&config_dir)?;

    if json {
        let rows: Vec<Row> = registry
            .iter()
            .map(|sub| Row {
                name: sub.name.clone(),
                path: sub.path.display().to_string(),
                snapshots: sub.snapshot_count(),
            })
            .collect();
        let s = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
        println!("{s}");
        return Ok(());
    }

    if registry.is_empty() {
        println!("(no subvolumes)");
        return Ok(());
    }
    println!("{:<20} {:<36} {:>9}", "NAME", "PATH", "SNAPSHOTS");
    for sub in registry.iter() {
        println!(
            "{:<20} {:<36} {:>9}",
            sub.name,
            sub.path.display(),
            sub.snapshot_count()
        );
    }
    Ok(())
}
