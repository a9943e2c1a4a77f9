use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

use Snapkeep::registry::Registry;
use Snapkeep::snapshot::Snapshot;
use Snapkeep::state;
use Snapkeep::subvolume::Subvolume;
use Snapkeep::tier::{KeepCounts, Tier};

#[test]
fn missing_state_file_means_empty_registry() -> Result<()> {
    let root = unique_root("nostate");
    let registry = Registry::from_state(state::load_state(&root)?)?;
    assert!(registry.is_empty());
    Ok(())
}

#[test]
fn disk_roundtrip_preserves_subvolumes_and_snapshots() -> Result<()> {
    let root = unique_root("roundtrip");
    fs::create_dir_all(&root)?;

    // 1) два сабволюма с разными keep и снапшотами
    let mut registry = Registry::new();
    let mut home = Subvolume::new(
        "home",
        "/mnt/home",
        KeepCounts {
            hourly: 24,
            daily: 7,
            weekly: 4,
            monthly: 12,
            yearly: 2,
        },
    );
    home.append_existing_snapshot(snap("home", Tier::Init, dt(2026, 1, 1, 0, 0)));
    home.append_existing_snapshot(snap("home", Tier::Hourly, dt(2026, 1, 1, 10, 0)));
    home.append_existing_snapshot(snap("home", Tier::Daily, dt(2026, 1, 2, 0, 0)));
    registry.insert(home)?;
    registry.insert(Subvolume::new("var", "/mnt/var", KeepCounts::default()))?;

    // 2) save -> load
    state::save_state(&root, &registry.to_state())?;
    let reloaded = Registry::from_state(state::load_state(&root)?)?;

    // 3) состав и порядок совпадают
    assert_eq!(reloaded.len(), 2);
    let names: Vec<String> = reloaded.iter().map(|s| s.name.clone()).collect();
    assert_eq!(names, vec!["home", "var"], "iteration must stay alphabetical");

    let home = reloaded.get("home")?;
    assert_eq!(home.path, PathBuf::from("/mnt/home"));
    assert_eq!(home.keep.hourly, 24);
    assert_eq!(home.keep.yearly, 2);
    assert_eq!(home.snapshot_count(), 3);
    assert_eq!(home.tier_count(Tier::Init), 1);
    assert_eq!(home.tier_count(Tier::Hourly), 1);
    assert_eq!(home.tier_count(Tier::Daily), 1);
    let first = home.oldest(None)?;
    assert_eq!(first.name, "home-2026-01-01T00:00:00");
    assert!(first.read_only);
    assert_eq!(first.created_at, dt(2026, 1, 1, 0, 0));

    assert_eq!(reloaded.get("var")?.snapshot_count(), 0);
    Ok(())
}

#[test]
fn second_save_keeps_previous_version_as_bak() -> Result<()> {
    let root = unique_root("bak");
    fs::create_dir_all(&root)?;

    let mut registry = Registry::new();
    registry.insert(Subvolume::new("a", "/mnt/a", KeepCounts::default()))?;
    state::save_state(&root, &registry.to_state())?;

    registry.insert(Subvolume::new("b", "/mnt/b", KeepCounts::default()))?;
    state::save_state(&root, &registry.to_state())?;

    let bak = root.join("snapkeep.toml.bak");
    assert!(bak.exists(), ".bak must hold the previous version");
    let prev: Registry = Registry::from_state(toml::from_str(&fs::read_to_string(&bak)?)?)?;
    assert_eq!(prev.len(), 1, "bak is the state before the second save");
    let cur = Registry::from_state(state::load_state(&root)?)?;
    assert_eq!(cur.len(), 2);
    Ok(())
}

#[test]
fn version_mismatch_is_rejected() -> Result<()> {
    let root = unique_root("version");
    fs::create_dir_all(&root)?;
    fs::write(
        root.join("snapkeep.toml"),
        "version = 99\n\n[subvolumes]\n",
    )?;

    let err = state::load_state(&root).unwrap_err();
    assert!(
        err.to_string().contains("version"),
        "unexpected error: {}",
        err
    );
    Ok(())
}

#[test]
fn corrupt_state_file_is_an_error_not_a_reset() -> Result<()> {
    let root = unique_root("corrupt");
    fs::create_dir_all(&root)?;
    fs::write(root.join("snapkeep.toml"), "version = [not toml")?;
    assert!(state::load_state(&root).is_err());
    Ok(())
}

#[test]
fn defaults_file_fills_unset_counts() -> Result<()> {
    let root = unique_root("defaults");
    fs::create_dir_all(&root)?;

    // 1) нет файла: встроенные дефолты
    let builtin = state::load_defaults(&root)?;
    assert_eq!(
        (builtin.hourly, builtin.daily, builtin.weekly, builtin.monthly, builtin.yearly),
        (10, 10, 0, 10, 10)
    );

    // 2) частичный файл: заданное поверх встроенного
    fs::write(root.join("snapkeep-default.toml"), "hourly = 24\nyearly = 3\n")?;
    let merged = state::load_defaults(&root)?;
    assert_eq!(merged.hourly, 24);
    assert_eq!(merged.daily, 10);
    assert_eq!(merged.weekly, 0);
    assert_eq!(merged.yearly, 3);

    // 3) мусор в файле: ошибка, не тихий сброс
    fs::write(root.join("snapkeep-default.toml"), "hourly = \"ten\"")?;
    assert!(state::load_defaults(&root).is_err());
    Ok(())
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn snap(subvolume: &str, tier: Tier, at: NaiveDateTime) -> Snapshot {
    let name = format!("{}-{}", subvolume, at.format("%Y-%m-%dT%H:%M:%S"));
    Snapshot {
        path: PathBuf::from(format!("/mnt/{}/.snapshots/{}", subvolume, name)),
        name,
        tier,
        created_at: at,
        read_only: true,
    }
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("snapkeep-{}-{}-{}", prefix, pid, t))
}
