//! Timestamp utilities

use chrono::{DateTime, Duration, FixedOffset, NaiveTime, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Midnight of the day containing `now`, as observed at `offset`
///
/// With a zero offset this is plain UTC truncation to the day.
pub fn start_of_day(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    let local_midnight = now
        .with_timezone(&offset)
        .date_naive()
        .and_time(NaiveTime::MIN);
    local_midnight.and_utc() - Duration::seconds(i64::from(offset.local_minus_utc()))
}

/// Half-open window `[start, start + 24h)` of the day containing `now`
pub fn day_window(now: DateTime<Utc>, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = start_of_day(now, offset);
    (start, start + Duration::hours(24))
}

/// Build a fixed offset from minutes east of UTC
///
/// Returns `None` for offsets of a day or more.
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

/// Encode a timestamp as unix milliseconds for storage
pub fn to_millis(ts: DateTime<Utc>) -> i64 {
    ts.timestamp_millis()
}

/// Decode unix milliseconds read from storage
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_now_returns_recent_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
        assert!(timestamp.timestamp() < 4_102_444_800); // 2100-01-01 00:00:00 UTC
    }

    #[test]
    fn test_start_of_day_utc_truncates() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 17, 45, 12).unwrap();
        assert_eq!(
            start_of_day(ts, utc()),
            Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_at_midnight_is_identity() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
        assert_eq!(start_of_day(ts, utc()), ts);
    }

    #[test]
    fn test_start_of_day_positive_offset() {
        // 23:30 UTC is already the next day at UTC+2
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 23, 30, 0).unwrap();
        let offset = offset_from_minutes(120).unwrap();
        assert_eq!(
            start_of_day(ts, offset),
            Utc.with_ymd_and_hms(2024, 3, 10, 22, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_start_of_day_negative_offset() {
        // 02:00 UTC is still the previous day at UTC-5
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 2, 0, 0).unwrap();
        let offset = offset_from_minutes(-300).unwrap();
        assert_eq!(
            start_of_day(ts, offset),
            Utc.with_ymd_and_hms(2024, 3, 9, 5, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_day_window_is_24_hours() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let (start, end) = day_window(ts, utc());
        assert_eq!(end - start, Duration::hours(24));
        assert!(start <= ts && ts < end);
    }

    #[test]
    fn test_offset_from_minutes_rejects_full_day() {
        assert!(offset_from_minutes(24 * 60).is_none());
        assert!(offset_from_minutes(-24 * 60).is_none());
        assert!(offset_from_minutes(i32::MAX).is_none());
    }

    #[test]
    fn test_millis_conversion_preserves_millisecond_precision() {
        let ts = Utc.timestamp_millis_opt(1_710_000_123_456).unwrap();
        assert_eq!(from_millis(to_millis(ts)), Some(ts));
    }
}
