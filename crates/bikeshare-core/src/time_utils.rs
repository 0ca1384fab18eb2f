use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use tracing::debug;

use crate::models::DayOfWeek;

/// Layouts accepted for trip timestamps, most common first.
///
/// The published files use `2017-01-01 00:07:57`; the other layouts cover
/// re-exported data.
const FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

// ── Timestamp parsing ─────────────────────────────────────────────────────────

/// Parse a trip timestamp as naive local time.
///
/// No timezone conversion is applied. A bare date (`2017-03-01`) is read as
/// midnight. Returns `None` for empty strings or unrecognised layouts.
pub fn parse_trip_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    debug!("could not parse trip timestamp \"{}\"", s);
    None
}

// ── CalendarFields ────────────────────────────────────────────────────────────

/// Calendar fields derived from a trip's start time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarFields {
    /// 1 = January.
    pub month: u32,
    pub weekday: DayOfWeek,
    /// 0–23.
    pub hour: u32,
}

impl CalendarFields {
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        Self {
            month: dt.month(),
            weekday: DayOfWeek::from(dt.weekday()),
            hour: dt.hour(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
