//! Чистая логика retention: классификация тиров и отбор жертв prune.
//!
//! Никакого I/O. Функции считают по паре таймштампов и по срезу снапшотов;
//! исполнение взятий и удалений — в rotation.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};

use crate::consts::MIN_TAKE_INTERVAL_HOURS;
use crate::snapshot::Snapshot;
use crate::tier::Tier;

/// Пора ли брать новый снапшот: с newest прошёл минимум час.
/// Раньше срока — идемпотентный skip, не ошибка.
pub fn due(prev: NaiveDateTime, now: NaiveDateTime) -> bool {
    now >= prev + Duration::hours(MIN_TAKE_INTERVAL_HOURS)
}

/// Классификация нового снапшота по паре (prev, now), оба наивные локальные.
///
/// Порядок проверок фиксированный, первый матч выигрывает:
/// yearly -> monthly -> weekly -> daily -> hourly. Ошибок не бывает, результат
/// ровно один. Старшие тиры раньше младших: снапшот в 00:00 1 января — yearly,
/// не monthly и не daily, хотя их условия тоже истинны.
///
/// Тир присваивается первому снапшоту, пересёкшему календарную границу:
/// now стоит на граничном дне (1 января / 1-е число / понедельник / час 0),
/// а prev остался в предыдущем календарном дне. Кредитуется только граница
/// между двумя фактическими таймштампами; пропущенные прогоны задним числом
/// ничего не досоздают.
pub fn classify(prev: NaiveDateTime, now: NaiveDateTime) -> Tier {
    let crossed_day = prev.date() < now.date();
    if now.month() == 1 && now.day() == 1 && crossed_day {
        return Tier::Yearly;
    }
    if now.day() == 1 && crossed_day {
        return Tier::Monthly;
    }
    if now.weekday() == Weekday::Mon && crossed_day {
        return Tier::Weekly;
    }
    if now.hour() == 0 && crossed_day {
        return Tier::Daily;
    }
    Tier::Hourly
}

/// Отбор жертв prune для одного тира: старейшие сверх keep-порога.
///
/// Срез приходит отсортированным по created_at; фильтр порядок сохраняет.
/// keep = 0 выметает тир целиком. Init в prunable-тиры не входит и сюда
/// не попадает.
pub fn prune_victims(snapshots: &[Snapshot], tier: Tier, keep: u32) -> Vec<String> {
    debug_assert!(tier.is_prunable());
    let members: Vec<&Snapshot> = snapshots.iter().filter(|s| s.tier == tier).collect();
    let keep = keep as usize;
    if members.len() <= keep {
        return Vec::new();
    }
    let excess = members.len() - keep;
    members[..excess].iter().map(|s| s.name.clone()).collect()
}
