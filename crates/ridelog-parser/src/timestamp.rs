use chrono::{DateTime, NaiveDateTime};

/// Accepted timestamp layouts, tried in order. Anything else is treated as missing.
pub const TIMESTAMP_FORMATS: &[&str] = &[
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Layout used when timestamps are written back out. `%.f` prints nothing for whole
/// seconds, so sub-second values survive a reload.
pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
}

pub fn parse_timestamp_micros(value: &str) -> Option<i64> {
    parse_timestamp(value).map(|dt| dt.and_utc().timestamp_micros())
}

pub fn micros_to_datetime(micros: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_micros(micros).map(|dt| dt.naive_utc())
}

pub fn format_timestamp_micros(micros: i64) -> Option<String> {
    micros_to_datetime(micros).map(|dt| dt.format(EXPORT_TIMESTAMP_FORMAT).to_string())
}
