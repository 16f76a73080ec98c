//! 排序键时间格式。
//!
//! 存储层按字符串比较 `edge_time_stamp`，因此统一使用定宽 UTC 格式
//! `YYYY-MM-DDTHH:MM:SS.ffffffZ`，字典序即时间序。

use crate::error::ReadingError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const SORT_KEY_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// 将时间点格式化为排序键。
pub fn format_sort_key(ts: &DateTime<Utc>) -> String {
    ts.format(SORT_KEY_FORMAT).to_string()
}

/// 解析排序键；兼容带时区偏移的 RFC 3339 以及无时区的 `YYYY-MM-DD HH:MM:SS.ffffff`（按 UTC 处理）。
pub fn parse_sort_key(value: &str) -> Result<DateTime<Utc>, ReadingError> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }
    Err(ReadingError::InvalidTimestamp(value.to_string()))
}

/// 某天开始时刻（00:00:00.000000）的排序键。
pub fn day_start_key(date: NaiveDate) -> String {
    let start = date.and_time(chrono::NaiveTime::MIN);
    format_sort_key(&Utc.from_utc_datetime(&start))
}

/// 某天结束时刻（23:59:59.999999）的排序键。
pub fn day_end_key(date: NaiveDate) -> String {
    let end = date
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN));
    format_sort_key(&Utc.from_utc_datetime(&end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_key_is_fixed_width_and_ordered() {
        let early = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let early_key = format_sort_key(&early);
        assert_eq!(early_key, "2024-05-01T09:00:00.000000Z");
        assert_eq!(early_key.len(), format_sort_key(&late).len());
        assert!(early_key < format_sort_key(&late));
    }

    #[test]
    fn day_bounds_enclose_every_instant_of_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let noon = format_sort_key(&Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap());
        let last = format_sort_key(&Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 59).unwrap());
        let next_day = format_sort_key(&Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap());
        assert!(day_start_key(date) <= noon && noon <= day_end_key(date));
        assert!(last <= day_end_key(date));
        assert!(next_day > day_end_key(date));
    }

    #[test]
    fn parse_accepts_legacy_space_separated_timestamps() {
        let ts = parse_sort_key("2024-05-01 12:34:56.123456").expect("parse");
        assert_eq!(format_sort_key(&ts), "2024-05-01T12:34:56.123456Z");
        let round_trip = parse_sort_key(&format_sort_key(&ts)).expect("parse");
        assert_eq!(round_trip, ts);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(parse_sort_key("yesterday").is_err());
    }
}
