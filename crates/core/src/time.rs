use chrono::{DateTime, SecondsFormat, Utc};

pub fn unix_now() -> i64 {
    Utc::now().timestamp()
}

/// Renders unix seconds as RFC3339 in UTC, falling back to the raw number for
/// values chrono cannot represent.
pub fn format_unix(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| secs.to_string())
}
