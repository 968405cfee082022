use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Fixed UTC offset of the monitored market (Buenos Aires, no DST).
pub const MARKET_UTC_OFFSET_SECS: i32 = -3 * 3600;

/// Current wall-clock time in unix milliseconds.
pub fn now_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

fn market_offset() -> FixedOffset {
    FixedOffset::east_opt(MARKET_UTC_OFFSET_SECS).unwrap()
}

/// Converts a unix-millisecond timestamp into market-local time.
pub fn market_local(ts_ms: u64) -> DateTime<FixedOffset> {
    DateTime::from_timestamp_millis(ts_ms as i64)
        .unwrap_or(DateTime::UNIX_EPOCH)
        .with_timezone(&market_offset())
}

/// Market-local "HH:MM" label for a timestamp.
pub fn time_label(ts_ms: u64) -> String {
    market_local(ts_ms).format("%H:%M").to_string()
}

/// Market-local calendar date of a timestamp.
pub fn market_day(ts_ms: u64) -> NaiveDate {
    market_local(ts_ms).date_naive()
}
