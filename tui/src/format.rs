use std::fmt;

use chrono::{DateTime, Local, TimeZone};

/// Render the backend's timestamp in local time; unparseable values are shown as sent.
pub(crate) fn format_timestamp(raw: &str) -> String {
    format_timestamp_in(raw, &Local)
}

pub(crate) fn format_timestamp_in<Tz>(raw: &str, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(ts) => ts
            .with_timezone(tz)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        Err(_) => raw.to_string(),
    }
}
