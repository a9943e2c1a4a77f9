//! Тиры снапшотов и keep-счётчики retention.
//!
//! Шесть тиров: init (первый снапшот сабволюма, вечный) и пять prunable
//! (hourly/daily/weekly/monthly/yearly). Каждый снапшот принадлежит ровно
//! одному тиру, назначенному в момент взятия; задним числом тиры не
//! пересматриваются.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_KEEP_DAILY, DEFAULT_KEEP_HOURLY, DEFAULT_KEEP_MONTHLY, DEFAULT_KEEP_WEEKLY,
    DEFAULT_KEEP_YEARLY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Init,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Tier {
    /// Тиры, участвующие в retention. Init сюда не входит никогда.
    pub const PRUNABLE: [Tier; 5] = [
        Tier::Hourly,
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
    ];

    pub fn is_prunable(self) -> bool {
        !matches!(self, Tier::Init)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Init => "init",
            Tier::Hourly => "hourly",
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
            Tier::Yearly => "yearly",
        }
    }

    fn ordinal(self) -> usize {
        match self {
            Tier::Init => 0,
            Tier::Hourly => 1,
            Tier::Daily => 2,
            Tier::Weekly => 3,
            Tier::Monthly => 4,
            Tier::Yearly => 5,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------- KeepCounts ----------

fn default_keep_hourly() -> u32 {
    DEFAULT_KEEP_HOURLY
}
fn default_keep_daily() -> u32 {
    DEFAULT_KEEP_DAILY
}
fn default_keep_monthly() -> u32 {
    DEFAULT_KEEP_MONTHLY
}
fn default_keep_yearly() -> u32 {
    DEFAULT_KEEP_YEARLY
}

/// Сколько снапшотов удерживать в каждом prunable-тире.
///
/// 0 — законное значение: тир вычищается целиком (weekly по умолчанию).
/// Для init порога нет, он не подрезается в принципе.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeepCounts {
    #[serde(default = "default_keep_hourly")]
    pub hourly: u32,
    #[serde(default = "default_keep_daily")]
    pub daily: u32,
    #[serde(default)]
    pub weekly: u32,
    #[serde(default = "default_keep_monthly")]
    pub monthly: u32,
    #[serde(default = "default_keep_yearly")]
    pub yearly: u32,
}

impl Default for KeepCounts {
    fn default() -> Self {
        KeepCounts {
            hourly: DEFAULT_KEEP_HOURLY,
            daily: DEFAULT_KEEP_DAILY,
            weekly: DEFAULT_KEEP_WEEKLY,
            monthly: DEFAULT_KEEP_MONTHLY,
            yearly: DEFAULT_KEEP_YEARLY,
        }
    }
}

impl KeepCounts {
    /// Порог для prunable-тира; None для init.
    pub fn cap(&self, tier: Tier) -> Option<u32> {
        match tier {
            Tier::Init => None,
            Tier::Hourly => Some(self.hourly),
            Tier::Daily => Some(self.daily),
            Tier::Weekly => Some(self.weekly),
            Tier::Monthly => Some(self.monthly),
            Tier::Yearly => Some(self.yearly),
        }
    }
}

impl fmt::Display for KeepCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hourly={} daily={} weekly={} monthly={} yearly={}",
            self.hourly, self.daily, self.weekly, self.monthly, self.yearly
        )
    }
}

// ---------- TierCounts ----------

/// Бегущие счётчики по тирам внутри одного сабволюма.
///
/// Инкремент при append, декремент при удалении; init считается отдельно
/// и в retention не участвует.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierCounts {
    counts: [u32; 6],
}

impl TierCounts {
    pub fn get(&self, tier: Tier) -> u32 {
        self.counts[tier.ordinal()]
    }

    pub(crate) fn inc(&mut self, tier: Tier) {
        self.counts[tier.ordinal()] = self.counts[tier.ordinal()].saturating_add(1);
    }

    pub(crate) fn dec(&mut self, tier: Tier) {
        self.counts[tier.ordinal()] = self.counts[tier.ordinal()].saturating_sub(1);
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }
}
