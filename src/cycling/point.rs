// src/cycling/point.rs

//! Cycle points: coordinates in a task's recurrence timeline.
//!
//! A point is either an integer sequence value or an ISO8601 date-time,
//! with or without an explicit UTC offset. The source string is retained
//! so that a parsed point renders back exactly as it was written;
//! equality, ordering and hashing use the parsed value only.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::cycling::interval::Interval;
use crate::errors::{CycleflowError, Result};

/// Local UTC offset as an explicit value, computed once at process start
/// and threaded through cycle-point arithmetic (never read from ambient
/// global state mid-run).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeZoneOffset {
    pub hours: i32,
    pub minutes: i32,
}

impl TimeZoneOffset {
    /// The offset of the process-local timezone right now.
    pub fn local() -> Self {
        let seconds = chrono::Local::now().offset().local_minus_utc();
        Self::from_seconds(seconds)
    }

    pub fn utc() -> Self {
        Self { hours: 0, minutes: 0 }
    }

    pub fn from_seconds(seconds: i32) -> Self {
        Self {
            hours: seconds / 3600,
            minutes: (seconds % 3600) / 60,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        3600 * i64::from(self.hours) + 60 * i64::from(self.minutes)
    }
}

/// Parsed value of a cycle point. Ordering is value-based: integer points
/// sort among themselves, date-time points by timestamp. A single workflow
/// never mixes the two families.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum PointValue {
    Integer(i64),
    DateTime {
        /// Normalised to UTC when an explicit offset was given, otherwise
        /// the naive local stamp as written.
        stamp: NaiveDateTime,
        /// Explicit UTC offset in seconds east, if the point carried one.
        offset: Option<i32>,
    },
}

/// An opaque, totally-ordered, string-renderable time coordinate.
#[derive(Debug, Clone)]
pub struct CyclePoint {
    repr: String,
    value: PointValue,
}

impl CyclePoint {
    /// Parse a cycle point string.
    ///
    /// Accepts integer sequence values and a fixed set of ISO8601 date-time
    /// layouts (extended and basic, zoned or naive). Anything else is a
    /// [`CycleflowError::MalformedCyclePoint`].
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CycleflowError::MalformedCyclePoint(s.to_string()));
        }

        // Short all-digit strings are integer cycling values, not years.
        let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
        if digits.len() <= 7 && digits.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(n) = trimmed.parse::<i64>() {
                return Ok(Self {
                    repr: trimmed.to_string(),
                    value: PointValue::Integer(n),
                });
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self {
                repr: trimmed.to_string(),
                value: PointValue::DateTime {
                    stamp: dt.naive_utc(),
                    offset: Some(dt.offset().local_minus_utc()),
                },
            });
        }

        // Basic-format UTC points like 20240101T0000Z.
        if let Some(body) = trimmed.strip_suffix('Z') {
            if let Some(stamp) = parse_naive_datetime(body) {
                return Ok(Self {
                    repr: trimmed.to_string(),
                    value: PointValue::DateTime {
                        stamp,
                        offset: Some(0),
                    },
                });
            }
        }

        if let Some(stamp) = parse_naive_datetime(trimmed) {
            return Ok(Self {
                repr: trimmed.to_string(),
                value: PointValue::DateTime {
                    stamp,
                    offset: None,
                },
            });
        }

        if let Ok(n) = trimmed.parse::<i64>() {
            return Ok(Self {
                repr: trimmed.to_string(),
                value: PointValue::Integer(n),
            });
        }

        Err(CycleflowError::MalformedCyclePoint(s.to_string()))
    }

    /// Whether this is an integer sequence value (vs a date-time).
    pub fn is_integer(&self) -> bool {
        matches!(self.value, PointValue::Integer(_))
    }

    /// Convert to seconds since the Unix epoch.
    ///
    /// Date-time points without an explicit zone get the supplied local
    /// offset applied exactly once. Integer points convert to their raw
    /// value (wallclock gates are only meaningful for date-time cycling).
    /// Deterministic: repeated calls always yield the same value.
    pub fn to_seconds(&self, tz: TimeZoneOffset) -> i64 {
        match &self.value {
            PointValue::Integer(n) => *n,
            PointValue::DateTime { stamp, offset } => {
                let naive = stamp.and_utc().timestamp();
                match offset {
                    // Stamp is already UTC-normalised.
                    Some(_) => naive,
                    None => naive + tz.total_seconds(),
                }
            }
        }
    }

    /// Offset this point by an interval. Pure arithmetic; computed points
    /// render in a canonical layout.
    pub fn add(&self, interval: &Interval) -> CyclePoint {
        let seconds = interval.as_seconds();
        let value = match &self.value {
            PointValue::Integer(n) => PointValue::Integer(n + seconds),
            PointValue::DateTime { stamp, offset } => PointValue::DateTime {
                stamp: *stamp + Duration::seconds(seconds),
                offset: *offset,
            },
        };
        CyclePoint {
            repr: render_value(&value),
            value,
        }
    }

    /// Seconds from `other` to `self`, or `None` when the points are from
    /// different families (integer vs date-time).
    pub fn seconds_since(&self, other: &CyclePoint) -> Option<i64> {
        match (&self.value, &other.value) {
            (PointValue::Integer(a), PointValue::Integer(b)) => Some(a - b),
            (
                PointValue::DateTime { stamp: a, .. },
                PointValue::DateTime { stamp: b, .. },
            ) => Some((*a - *b).num_seconds()),
            _ => None,
        }
    }
}

impl fmt::Display for CyclePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repr)
    }
}

impl PartialEq for CyclePoint {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for CyclePoint {}

impl PartialOrd for CyclePoint {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CyclePoint {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value.cmp(&other.value)
    }
}

impl Hash for CyclePoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

/// Naive (zone-less) layouts accepted for date-time points.
fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    const DATETIME_LAYOUTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y%m%dT%H%M%S",
        "%Y%m%dT%H%M",
    ];
    for layout in DATETIME_LAYOUTS {
        if let Ok(stamp) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(stamp);
        }
    }

    const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }

    None
}

/// Canonical rendering for computed points.
fn render_value(value: &PointValue) -> String {
    match value {
        PointValue::Integer(n) => n.to_string(),
        PointValue::DateTime { stamp, offset } => match offset {
            Some(0) => format!("{}Z", stamp.format("%Y-%m-%dT%H:%M:%S")),
            Some(off) => {
                let local = *stamp + Duration::seconds(i64::from(*off));
                let sign = if *off < 0 { '-' } else { '+' };
                let abs = off.abs();
                format!(
                    "{}{}{:02}:{:02}",
                    local.format("%Y-%m-%dT%H:%M:%S"),
                    sign,
                    abs / 3600,
                    (abs % 3600) / 60,
                )
            }
            None => stamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
        },
    }
}
