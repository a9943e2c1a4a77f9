use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use Snapkeep::subvolume::Subvolume;
use Snapkeep::util::format_ts;

use crate::util::load_registry;

#[derive(Serialize)]
struct Row {
    subvolume: String,
    index: usize,
    name: String,
    tier: String,
    created_at: String,
    path: String,
}

fn rows_of(sub: &Subvolume) -> Vec<Row> {
    sub.snapshots()
        .iter()
        .enumerate()
        .map(|(index, s)| Row {
            subvolume: sub.name.clone(),
            index,
            name: s.name.clone(),
            tier: s.tier.as_str().to_string(),
            created_at: format_ts(s.created_at),
            path: s.path.display().to_string(),
        })
        .collect()
}

pub fn exec(name: Option<String>, config_dir: PathBuf, json: bool) -> Result<()> {
    let registry = load_registry(&config_dir)?;

    let mut rows: Vec<Row> = Vec::new();
    match name {
        Some(name) => rows.extend(rows_of(registry.get(&name)?)),
        None => {
            for sub in registry.iter() {
                rows.extend(rows_of(sub));
            }
        }
    }

    if json {
        let s = serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string());
        println!("{s}");
        return Ok(());
    }

    if rows.is_empty() {
        println!("(no snapshots)");
        return Ok(());
    }
    println!(
        "{:<16} {:>5} {:<44} {:<8} {}",
        "SUBVOLUME", "INDEX", "NAME", "TIER", "CREATED"
    );
    for r in rows {
        println!(
            "{:<16} {:>5} {:<44} {:<8} {}",
            r.subvolume, r.index, r.name, r.tier, r.created_at
        );
    }
    Ok(())
}
