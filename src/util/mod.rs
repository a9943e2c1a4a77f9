//! util — хелперы времени и имён снапшотов.
//!
//! Содержит:
//! - now_local(): текущее наивное локальное время (без TZ-конверсий).
//! - format_ts()/parse_ts(): таймштамп секундного разрешения для имён.
//! - snapshot_name(): каноничное имя {subvolume}-{timestamp}.

use chrono::{Local, NaiveDateTime, Timelike};

use crate::consts::SNAPSHOT_TS_FORMAT;

/// Текущее локальное время без таймзоны, обрезанное до секунды.
///
/// Имена снапшотов живут в секундном разрешении; обрезка гарантирует,
/// что created_at и имя указывают на один и тот же момент.
pub fn now_local() -> NaiveDateTime {
    let now = Local::now().naive_local();
    // with_nanosecond(0) не проваливается для валидного времени.
    now.with_nanosecond(0).unwrap_or(now)
}

pub fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(SNAPSHOT_TS_FORMAT).to_string()
}

pub fn parse_ts(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, SNAPSHOT_TS_FORMAT).ok()
}

/// Имя снапшота: {subvolume}-{timestamp}.
pub fn snapshot_name(subvolume: &str, ts: NaiveDateTime) -> String {
    format!("{}-{}", subvolume, format_ts(ts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn now_local_truncates_subsec() {
        let t = now_local();
        assert_eq!(t.nanosecond(), 0);
    }

    #[test]
    fn ts_roundtrip() {
        let ts = NaiveDate::from_ymd_opt(2021, 3, 14)
            .unwrap()
            .and_hms_opt(10, 2, 3)
            .unwrap();
        let s = format_ts(ts);
        assert_eq!(s, "2021-03-14T10:02:03");
        assert_eq!(parse_ts(&s), Some(ts));
    }

    #[test]
    fn snapshot_name_format() {
        let ts = NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(snapshot_name("home", ts), "home-2022-01-01T00:00:00");
    }
}
