use anyhow::Result;
use serde::Serialize;
use std::path::PathBuf;

use Snapkeep::consts::STATE_VERSION;
use Snapkeep::metrics::{self, MetricsSnapshot};
use Snapkeep::state;
use Snapkeep::tier::Tier;

use crate::util::load_registry;

#[derive(Serialize)]
struct TierTotals {
    init: u32,
    hourly: u32,
    daily: u32,
    weekly: u32,
    monthly: u32,
    yearly: u32,
}

#[derive(Serialize)]
struct Status {
    config_dir: String,
    state_file: String,
    defaults_file: String,
    state_version: u32,
    subvolumes: usize,
    snapshots: u32,
    by_tier: TierTotals,
    metrics: MetricsSnapshot,
}

pub fn exec(config_dir: PathBuf, json: bool) -> Result<()> {
    let registry = load_registry(&config_dir)?;

    let mut totals = TierTotals {
        init: 0,
        hourly: 0,
        daily: 0,
        weekly: 0,
        monthly: 0,
        yearly: 0,
    };
    for sub in registry.iter() {
        totals.init += sub.tier_count(Tier::Init);
        totals.hourly += sub.tier_count(Tier::Hourly);
        totals.daily += sub.tier_count(Tier::Daily);
        totals.weekly += sub.tier_count(Tier::Weekly);
        totals.monthly += sub.tier_count(Tier::Monthly);
        totals.yearly += sub.tier_count(Tier::Yearly);
    }
    let snapshots = totals.init
        + totals.hourly
        + totals.daily
        + totals.weekly
        + totals.monthly
        + totals.yearly;
    let ms = metrics::snapshot();

    if json {
        let status = Status {
            config_dir: config_dir.display().to_string(),
            state_file: state::state_path(&config_dir).display().to_string(),
            defaults_file: state::defaults_path(&config_dir).display().to_string(),
            state_version: STATE_VERSION,
            subvolumes: registry.len(),
            snapshots,
            by_tier: totals,
            metrics: ms,
        };
        let s = serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string());
        println!("{s}");
        return Ok(());
    }

    println!("Snapkeep status");
    println!("  config_dir    = {}", config_dir.display());
    println!(
        "  state_file    = {} (version {})",
        state::state_path(&config_dir).display(),
        STATE_VERSION
    );
    println!(
        "  defaults_file = {}",
        state::defaults_path(&config_dir).display()
    );
    println!("  subvolumes    = {}", registry.len());
    println!(
        "  snapshots     = {} (init={} hourly={} daily={} weekly={} monthly={} yearly={})",
        snapshots,
        totals.init,
        totals.hourly,
        totals.daily,
        totals.weekly,
        totals.monthly,
        totals.yearly
    );
    println!("Metrics");
    println!("  rotation_passes    = {}", ms.rotation_passes);
    println!("  snapshots_taken    = {}", ms.snapshots_taken);
    println!("  take_failures      = {}", ms.take_failures);
    println!("  subvolumes_skipped = {}", ms.subvolumes_skipped);
    println!("  snapshots_pruned   = {}", ms.snapshots_pruned);
    println!("  prune_failures     = {}", ms.prune_failures);
    println!(
        "  prune_failure_ratio = {:.2}%",
        ms.prune_failure_ratio() * 100.0
    );
    Ok(())
}
