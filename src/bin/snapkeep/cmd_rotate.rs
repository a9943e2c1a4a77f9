use anyhow::{anyhow, Result};
use log::warn;
use std::path::PathBuf;

use Snapkeep::rotation::{run_pass, PassReport};
use Snapkeep::util::now_local;

use crate::util::{load_registry, make_backend, save_registry};

pub fn exec(config_dir: PathBuf, timeout_secs: u64, dry_run: bool, json: bool) -> Result<()> {
    let mut registry = load_registry(&config_dir)?;
    if registry.is_empty() {
        warn!("registry is empty, nothing to rotate");
        println!("(no subvolumes)");
        return Ok(());
    }

    let backend = make_backend(dry_run, timeout_secs);
    let report = run_pass(&mut registry, backend.as_ref(), now_local());

    // Состояние пишется до разбора отказов: успешные взятия и удаления
    // уже случились на диске и должны быть зафиксированы.
    if !dry_run {
        save_registry(&config_dir, &registry)?;
    }

    if json {
        let s = serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string());
        println!("{s}");
    } else {
        print_report(&report);
        if dry_run {
            println!("rotate: dry-run, state not saved");
        }
    }

    if report.has_failures() {
        return Err(anyhow!(
            "rotation pass completed with {} failure(s)",
            report.failures()
        ));
    }
    Ok(())
}

fn print_report(report: &PassReport) {
    for sub in &report.subvolumes {
        if let Some(taken) = &sub.taken {
            println!("{}: took {} snapshot {}", sub.subvolume, taken.tier, taken.name);
        }
        if let Some(reason) = &sub.skipped {
            println!("{}: skipped ({})", sub.subvolume, reason);
        }
        if let Some(err) = &sub.take_error {
            println!("{}: take FAILED: {}", sub.subvolume, err);
        }
        for name in &sub.pruned {
            println!("{}: pruned {}", sub.subvolume, name);
        }
        for f in &sub.prune_failures {
            println!("{}: prune FAILED for {}: {}", sub.subvolume, f.snapshot, f.error);
        }
    }
    println!(
        "rotate: taken={} pruned={} failures={}",
        report.taken(),
        report.pruned(),
        report.failures()
    );
}
