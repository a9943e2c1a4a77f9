use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::PathBuf;

use Snapkeep::backend::MockBackend;
use Snapkeep::registry::Registry;
use Snapkeep::rotation::run_pass;
use Snapkeep::snapshot::Snapshot;
use Snapkeep::subvolume::Subvolume;
use Snapkeep::tier::{KeepCounts, Tier};

#[test]
fn empty_registry_pass_is_noop() {
    let backend = MockBackend::new();
    let mut registry = Registry::new();
    let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 10, 0));
    assert!(report.subvolumes.is_empty());
    assert!(!report.has_failures());
}

#[test]
fn first_pass_takes_init_without_gate() -> Result<()> {
    let backend = MockBackend::new().with_subvolume("/mnt/home");
    let mut registry = Registry::new();
    registry.insert(Subvolume::new("home", "/mnt/home", KeepCounts::default()))?;

    let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 10, 30));
    assert_eq!(report.taken(), 1);
    let taken = report.subvolumes[0].taken.as_ref().unwrap();
    assert_eq!(taken.tier, Tier::Init);
    assert_eq!(registry.get("home")?.tier_count(Tier::Init), 1);
    Ok(())
}

#[test]
fn too_soon_pass_skips_and_stays_idempotent() -> Result<()> {
    let backend = MockBackend::new().with_subvolume("/mnt/home");
    let mut registry = Registry::new();
    let mut sub = Subvolume::new("home", "/mnt/home", KeepCounts::default());
    sub.take_snapshot(&backend, dt(2026, 3, 2, 10, 0), Tier::Init, true)?;
    registry.insert(sub)?;

    for _ in 0..3 {
        let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 10, 40));
        assert_eq!(report.taken(), 0);
        assert!(report.subvolumes[0].skipped.is_some());
        assert!(!report.has_failures());
        assert_eq!(registry.get("home")?.snapshot_count(), 1);
    }
    Ok(())
}

#[test]
fn take_failure_is_terminal_for_that_subvolume_only() -> Result<()> {
    // "gone" нет на диске: взятие падает, его prune не запускается,
    // а сосед "home" обрабатывается как обычно.
    let backend = MockBackend::new().with_subvolume("/mnt/home");
    let mut registry = Registry::new();

    let mut gone = Subvolume::new(
        "gone",
        "/mnt/gone",
        KeepCounts {
            hourly: 0,
            ..KeepCounts::default()
        },
    );
    let stale = snap("gone", Tier::Hourly, dt(2026, 3, 2, 8, 0));
    backend.add_subvolume(stale.path.clone());
    gone.append_existing_snapshot(stale);
    registry.insert(gone)?;

    let mut home = Subvolume::new("home", "/mnt/home", KeepCounts::default());
    home.take_snapshot(&backend, dt(2026, 3, 2, 8, 0), Tier::Init, true)?;
    registry.insert(home)?;

    let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 9, 0));

    let gone_report = report
        .subvolumes
        .iter()
        .find(|s| s.subvolume == "gone")
        .unwrap();
    assert!(gone_report.take_error.is_some());
    assert!(
        gone_report.pruned.is_empty(),
        "failed take must leave pruning untouched"
    );
    assert_eq!(registry.get("gone")?.tier_count(Tier::Hourly), 1);

    let home_report = report
        .subvolumes
        .iter()
        .find(|s| s.subvolume == "home")
        .unwrap();
    assert!(home_report.taken.is_some());
    assert!(home_report.take_error.is_none());
    Ok(())
}

#[test]
fn prune_runs_even_when_take_is_skipped() -> Result<()> {
    let backend = MockBackend::new().with_subvolume("/mnt/home");
    let mut registry = Registry::new();
    let mut sub = Subvolume::new(
        "home",
        "/mnt/home",
        KeepCounts {
            hourly: 1,
            ..KeepCounts::default()
        },
    );
    for s in [
        snap("home", Tier::Init, dt(2026, 3, 2, 7, 0)),
        snap("home", Tier::Hourly, dt(2026, 3, 2, 8, 0)),
        snap("home", Tier::Hourly, dt(2026, 3, 2, 9, 0)),
    ] {
        backend.add_subvolume(s.path.clone());
        sub.append_existing_snapshot(s);
    }
    registry.insert(sub)?;

    // 09:20 — рано для взятия, но hourly сверх лимита подрезается.
    let report = run_pass(&mut registry, &backend, dt(2026, 3, 2, 9, 20));
    assert_eq!(report.taken(), 0);
    assert!(report.subvolumes[0].skipped.is_some());
    assert_eq!(report.subvolumes[0].pruned, vec!["home-2026-03-02T08:00:00"]);

    let sub = registry.get("home")?;
    assert_eq!(sub.tier_count(Tier::Hourly), 1);
    assert_eq!(sub.tier_count(Tier::Init), 1);
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
