use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

use Snapkeep::backend::MockBackend;
use Snapkeep::registry::Registry;
use Snapkeep::rotation::run_pass;
use Snapkeep::state;
use Snapkeep::subvolume::Subvolume;
use Snapkeep::tier::{KeepCounts, Tier};

#[test]
fn smoke_track_rotate_persist_reload() -> Result<()> {
    let root = unique_root("smoke");
    fs::create_dir_all(&root)?;

    // 1) track + init snapshot
    let backend = MockBackend::new().with_subvolume("/mnt/home");
    let mut registry = Registry::new();
    let mut sub = Subvolume::new("home", "/mnt/home", KeepCounts::default());
    sub.take_snapshot(&backend, dt(2026, 3, 2, 10, 0), Tier::Init, true)?;
    registry.insert(sub)?;

    // 2) час спустя: hourly
    let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 11, 0));
    assert_eq!(report.taken(), 1);
    assert!(!report.has_failures());
    {
        let sub = registry.get("home")?;
        assert_eq!(sub.tier_count(Tier::Init), 1);
        assert_eq!(sub.tier_count(Tier::Hourly), 1);
        assert_eq!(
            sub.newest(None)?.name,
            "home-2026-03-02T11:00:00",
            "name must be {{subvolume}}-{{timestamp}}"
        );
    }

    // 3) через полночь (вторник): daily
    let report = run_pass(&mut registry, &backend, dt(2026, 3, 3, 0, 0));
    assert_eq!(report.taken(), 1);
    assert_eq!(registry.get("home")?.tier_count(Tier::Daily), 1);

    // 4) persist + reload: тот же состав
    state::save_state(&root, &registry.to_state())?;
    assert!(root.join("snapkeep.toml").exists());
    let reloaded = Registry::from_state(state::load_state(&root)?)?;
    {
        let a = registry.get("home")?;
        let b = reloaded.get("home")?;
        assert_eq!(a.snapshot_count(), b.snapshot_count());
        assert_eq!(a.keep, b.keep);
        let names_a: Vec<String> = a.snapshots().iter().map(|s| s.name.clone()).collect();
        let names_b: Vec<String> = b.snapshots().iter().map(|s| s.name.clone()).collect();
        assert_eq!(names_a, names_b, "persisted order must survive reload");
    }

    // 5) после reload гейт считается от сохранённого newest
    let mut reloaded = reloaded;
    let report = run_pass(&mut reloaded, &backend, dt(2026, 3, 3, 0, 30));
    assert_eq!(report.taken(), 0);
    assert!(report.subvolumes[0].skipped.is_some(), "sub-hourly pass must skip");
    assert_eq!(reloaded.get("home")?.snapshot_count(), 3);

    Ok(())
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("snapkeep-{}-{}-{}", prefix, pid, t))
}
