//! Lexical form of `xs:dateTime` values
//!
//! Values are read as timezone-aware instants. A value without an offset is
//! placed at the configured offset (UTC by default) and a bare date means
//! midnight. Values are written with millisecond precision and an explicit
//! offset, e.g. `2019-08-16T10:31:54.000+00:00`.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, SubsecRound, TimeZone, Utc,
};

/// A timezone-aware instant as stored on entities
pub type Timestamp = DateTime<FixedOffset>;

/// Parse an `xs:dateTime` (or `xs:date`) value
pub(crate) fn parse(value: &str, naive_offset: FixedOffset) -> Option<Timestamp> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Some(instant);
    }
    // No offset given
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive_offset.from_local_datetime(&naive).single();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M") {
        return naive_offset.from_local_datetime(&naive).single();
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date.and_hms_opt(0, 0, 0)?;
        return naive_offset.from_local_datetime(&midnight).single();
    }
    None
}

/// Format an instant in the canonical lexical form
pub(crate) fn format(instant: &Timestamp) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// The current instant, truncated to what [`format`] can represent
pub(crate) fn now() -> Timestamp {
    Utc::now().trunc_subsecs(3).fixed_offset()
}
