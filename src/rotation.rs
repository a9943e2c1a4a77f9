//! Оркестровка rotation-прохода: take -> classify -> append -> prune.
//!
//! Проход идёт по реестру в алфавитном порядке. Провал взятия терминален
//! только для своего сабволюма; отказы prune собираются в отчёт и не
//! прерывают ни тир, ни проход. Отчёт сериализуем (--json в CLI).

use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::Serialize;

use crate::backend::SubvolumeBackend;
use crate::metrics;
use crate::registry::Registry;
use crate::retention;
use crate::subvolume::Subvolume;
use crate::tier::Tier;

#[derive(Debug, Clone, Serialize)]
pub struct TakenSnapshot {
    pub name: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, Serialize)]
pub struct PruneFailure {
    pub snapshot: String,
    pub error: String,
}

/// Итог прохода по одному сабволюму.
#[derive(Debug, Clone, Serialize)]
pub struct SubvolumeReport {
    pub subvolume: String,
    /// Взятый снапшот; None при skip или провале взятия.
    pub taken: Option<TakenSnapshot>,
    /// Причина пропуска взятия (prune при этом всё равно выполняется).
    pub skipped: Option<String>,
    pub pruned: Vec<String>,
    pub prune_failures: Vec<PruneFailure>,
    /// Провал взятия; prune для сабволюма не запускался.
    pub take_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub started_at: NaiveDateTime,
    pub subvolumes: Vec<SubvolumeReport>,
}

impl PassReport {
    pub fn taken(&self) -> usize {
        self.subvolumes.iter().filter(|s| s.taken.is_some()).count()
    }

    pub fn pruned(&self) -> usize {
        self.subvolumes.iter().map(|s| s.pruned.len()).sum()
    }

    pub fn failures(&self) -> usize {
        self.subvolumes
            .iter()
            .map(|s| s.prune_failures.len() + usize::from(s.take_error.is_some()))
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failures() > 0
    }
}

/// Один rotation-проход по всему реестру. Пустой реестр — no-op.
///
/// Ошибок наружу нет: всё, что пошло не так, лежит в отчёте по своему
/// сабволюму. Вызывающий решает, что с этим делать (CLI печатает отчёт и
/// возвращает ненулевой код при провалах).
pub fn run_pass(
    registry: &mut Registry,
    backend: &dyn SubvolumeBackend,
    now: NaiveDateTime,
) -> PassReport {
    info!("rotation pass begin ({} subvolumes)", registry.len());
    let mut report = PassReport {
        started_at: now,
        subvolumes: Vec::new(),
    };
    for sub in registry.iter_mut() {
        report.subvolumes.push(rotate_subvolume(sub, backend, now));
    }
    metrics::record_pass();
    info!(
        "rotation pass done: taken={} pruned={} failures={}",
        report.taken(),
        report.pruned(),
        report.failures()
    );
    report
}

fn rotate_subvolume(
    sub: &mut Subvolume,
    backend: &dyn SubvolumeBackend,
    now: NaiveDateTime,
) -> SubvolumeReport {
    let mut r = SubvolumeReport {
        subvolume: sub.name.clone(),
        taken: None,
        skipped: None,
        pruned: Vec::new(),
        prune_failures: Vec::new(),
        take_error: None,
    };

    // Первый снапшот — init, без часового гейта; дальше гейт и классификация
    // по паре (prev, now). newest может отказать только Empty.
    let tier = match sub.newest(None) {
        Err(_) => Some(Tier::Init),
        Ok(prev) if !retention::due(prev.created_at, now) => {
            debug!(
                "{}: last snapshot {} is too recent, skipping take",
                sub.name, prev.name
            );
            r.skipped = Some(format!(
                "last snapshot {} is newer than the minimum interval",
                prev.name
            ));
            metrics::record_subvolume_skipped();
            None
        }
        Ok(prev) => Some(retention::classify(prev.created_at, now)),
    };

    if let Some(tier) = tier {
        match sub.take_snapshot(backend, now, tier, true) {
            Ok(snap) => {
                info!("{}: took {} snapshot {}", r.subvolume, tier, snap.name);
                r.taken = Some(TakenSnapshot {
                    name: snap.name.clone(),
                    tier,
                });
                metrics::record_snapshot_taken();
            }
            Err(e) => {
                warn!("{}: take failed: {}", sub.name, e);
                r.take_error = Some(e.to_string());
                metrics::record_take_failure();
                // Провал взятия терминален для сабволюма, prune не идёт.
                return r;
            }
        }
    }

    // Тиры подрезаются независимо; keep снимается до удалений, отказ по
    // одному снапшоту не отменяет остальные запланированные.
    for tier in Tier::PRUNABLE {
        let keep = match sub.keep.cap(tier) {
            Some(k) => k,
            None => continue,
        };
        let victims = retention::prune_victims(sub.snapshots(), tier, keep);
        for name in victims {
            match sub.delete_snapshot(backend, &name) {
                Ok(snap) => {
                    info!("{}: pruned {} snapshot {}", sub.name, tier, snap.name);
                    r.pruned.push(snap.name);
                    metrics::record_snapshot_pruned();
                }
                Err(e) => {
                    warn!("{}: prune of {} failed: {}", sub.name, name, e);
                    r.prune_failures.push(PruneFailure {
                        snapshot: name,
                        error: e.to_string(),
                    });
                    metrics::record_prune_failure();
                }
            }
        }
    }
    r
}
