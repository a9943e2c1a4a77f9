//! Lightweight global metrics for Snapkeep.
//!
//! Потокобезопасные атомарные счётчики для подсистем:
//! - Rotation (проходы, взятия, пропуски)
//! - Pruning (удаления, отказы)

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

// ----- Rotation -----
static ROTATION_PASSES: AtomicU64 = AtomicU64::new(0);
static SNAPSHOTS_TAKEN: AtomicU64 = AtomicU64::new(0);
static TAKE_FAILURES: AtomicU64 = AtomicU64::new(0);
static SUBVOLUMES_SKIPPED: AtomicU64 = AtomicU64::new(0);

// ----- Pruning -----
static SNAPSHOTS_PRUNED: AtomicU64 = AtomicU64::new(0);
static PRUNE_FAILURES: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MetricsSnapshot {
    // Rotation
    pub rotation_passes: u64,
    pub snapshots_taken: u64,
    pub take_failures: u64,
    pub subvolumes_skipped: u64,

    // Pruning
    pub snapshots_pruned: u64,
    pub prune_failures: u64,
}

impl MetricsSnapshot {
    pub fn prune_failure_ratio(&self) -> f64 {
        let total = self.snapshots_pruned + self.prune_failures;
        if total == 0 {
            0.0
        } else {
            self.prune_failures as f64 / total as f64
        }
    }
}

// ----- Recorders (Rotation) -----
pub fn record_pass() {
    ROTATION_PASSES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_snapshot_taken() {
    SNAPSHOTS_TAKEN.fetch_add(1, Ordering::Relaxed);
}

pub fn record_take_failure() {
    TAKE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

pub fn record_subvolume_skipped() {
    SUBVOLUMES_SKIPPED.fetch_add(1, Ordering::Relaxed);
}

// ----- Recorders (Pruning) -----
pub fn record_snapshot_pruned() {
    SNAPSHOTS_PRUNED.fetch_add(1, Ordering::Relaxed);
}

pub fn record_prune_failure() {
    PRUNE_FAILURES.fetch_add(1, Ordering::Relaxed);
}

// ----- Snapshot / Reset -----
pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        rotation_passes: ROTATION_PASSES.load(Ordering::Relaxed),
        snapshots_taken: SNAPSHOTS_TAKEN.load(Ordering::Relaxed),
        take_failures: TAKE_FAILURES.load(Ordering::Relaxed),
        subvolumes_skipped: SUBVOLUMES_SKIPPED.load(Ordering::Relaxed),

        snapshots_pruned: SNAPSHOTS_PRUNED.load(Ordering::Relaxed),
        prune_failures: PRUNE_FAILURES.load(Ordering::Relaxed),
    }
}

pub fn reset() {
    ROTATION_PASSES.store(0, Ordering::Relaxed);
    SNAPSHOTS_TAKEN.store(0, Ordering::Relaxed);
    TAKE_FAILURES.store(0, Ordering::Relaxed);
    SUBVOLUMES_SKIPPED.store(0, Ordering::Relaxed);

    SNAPSHOTS_PRUNED.store(0, Ordering::Relaxed);
    PRUNE_FAILURES.store(0, Ordering::Relaxed);
}
