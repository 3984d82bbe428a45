use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rand::Rng;
use std::time::Duration;

/// Marketplace timestamps and day boundaries are all expressed in UTC+9.
pub const KST_OFFSET_SECS: i32 = 9 * 3600;

pub async fn sleep_with_jitter(base_ms: u64, jitter_ms: u64) {
    tokio::time::sleep(Duration::from_millis(jittered_delay(base_ms, jitter_ms))).await;
}

/// `base_ms` plus up to `jitter_ms` of random spread.
fn jittered_delay(base_ms: u64, jitter_ms: u64) -> u64 {
    let jitter = if jitter_ms == 0 {
        0
    } else {
        rand::rng().random_range(0..=jitter_ms)
    };
    base_ms.saturating_add(jitter)
}

pub fn kst() -> FixedOffset {
    FixedOffset::east_opt(KST_OFFSET_SECS).expect("UTC+9 is a valid offset")
}

pub fn today_kst() -> NaiveDate {
    Utc::now().with_timezone(&kst()).date_naive()
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// `[00:00:00.000, 23:59:59.999]` of `day` in the marketplace's wire format.
pub fn day_bounds(day: NaiveDate) -> (String, String) {
    let ymd = day.format("%Y-%m-%d");
    (
        format!("{ymd}T00:00:00.000+09:00"),
        format!("{ymd}T23:59:59.999+09:00"),
    )
}

/// Every calendar day from `from` to `to`, both inclusive.
pub fn days_inclusive(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
    from.iter_days().take_while(|day| *day <= to).collect()
}

/// Strict `YYYY-MM-DD`; anything chrono would silently normalise is rejected.
pub fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    (date.format("%Y-%m-%d").to_string() == raw).then_some(date)
}

/// `MM/DD` of an ISO timestamp, in the timestamp's own offset.
pub fn month_day(iso: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(iso)
        .ok()
        .map(|dt| dt.format("%m/%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_delay_stays_in_range_and_saturates() {
        assert_eq!(jittered_delay(2000, 0), 2000);
        let delay = jittered_delay(2000, 500);
        assert!((2000..=2500).contains(&delay));
        assert_eq!(jittered_delay(u64::MAX, u64::MAX), u64::MAX);
    }

    #[test]
    fn day_bounds_cover_the_whole_day() {
        let day = NaiveDate::from_ymd_opt(2025, 2, 8).unwrap();
        let (from, to) = day_bounds(day);
        assert_eq!(from, "2025-02-08T00:00:00.000+09:00");
        assert_eq!(to, "2025-02-08T23:59:59.999+09:00");
    }

    #[test]
    fn days_inclusive_spans_month_end() {
        let from = NaiveDate::from_ymd_opt(2025, 1, 30).unwrap();
        let to = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        let days: Vec<String> = days_inclusive(from, to)
            .iter()
            .map(|d| d.to_string())
            .collect();
        assert_eq!(days, vec!["2025-01-30", "2025-01-31", "2025-02-01"]);
    }

    #[test]
    fn days_inclusive_single_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert_eq!(days_inclusive(day, day), vec![day]);
    }

    #[test]
    fn parse_ymd_is_strict() {
        assert!(parse_ymd("2025-02-08").is_some());
        assert!(parse_ymd("2025-2-8").is_none());
        assert!(parse_ymd("2025-02-30").is_none());
        assert!(parse_ymd("20250208").is_none());
        assert!(parse_ymd("").is_none());
    }

    #[test]
    fn month_day_keeps_the_offset() {
        assert_eq!(month_day("2025-02-08T23:30:00.0+09:00").as_deref(), Some("02/08"));
        assert_eq!(month_day("not a date"), None);
    }
}
