use anyhow::Result;
use std::path::PathBuf;

use Snapkeep::tier::Tier;

use crate::util::load_registry;

pub fn exec(name: String, config_dir: PathBuf) -> Result<()> {
    let registry = load_registry(&config_dir)?;
    let sub = registry.get(&name)?;

    println!("Subvolume {}", sub.name);
    println!("  path      = {}", sub.path.display());
    println!("  container = {}", sub.snapshot_dir().display());
    println!("  keep      = {}", sub.keep);
    println!("  snapshots = {}", sub.snapshot_count());
    println!("    init    = {}", sub.tier_count(Tier::Init));
    for tier in Tier::PRUNABLE {
        println!(
            "    {:<7} = {} (keep {})",
            tier.as_str(),
            sub.tier_count(tier),
            sub.keep.cap(tier).unwrap_or(0)
        );
    }
    match sub.newest(None) {
        Ok(snap) => println!("  newest    = {}", snap.name),
        Err(_) => println!("  newest    = (none)"),
    }
    Ok(())
}
