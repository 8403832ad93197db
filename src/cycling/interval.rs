// src/cycling/interval.rs

//! ISO8601 duration parsing, reduced to whole seconds.
//!
//! Calendar units use nominal lengths (365-day years, 30-day months) so
//! that every interval has a fixed seconds value. Integer-cycling offsets
//! are written as bare `P<n>` and count sequence units directly.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::errors::{CycleflowError, Result};

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3600;
const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_WEEK: i64 = 7 * SECONDS_PER_DAY;
const SECONDS_PER_MONTH: i64 = 30 * SECONDS_PER_DAY;
const SECONDS_PER_YEAR: i64 = 365 * SECONDS_PER_DAY;

/// A signed duration in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    seconds: i64,
}

impl Interval {
    /// Parse an ISO8601 duration (`P1D`, `PT30M`, `-P1DT6H`, ...) or a bare
    /// integer-cycling offset (`P3`). Fails with
    /// [`CycleflowError::MalformedDuration`] on anything else, including the
    /// empty designators `P` and `PT`.
    pub fn parse(spec: &str) -> Result<Self> {
        let trimmed = spec.trim();

        if let Some(caps) = integer_form_re().captures(trimmed) {
            let units: i64 = caps[2]
                .parse()
                .map_err(|_| CycleflowError::MalformedDuration(spec.to_string()))?;
            let sign = if &caps[1] == "-" { -1 } else { 1 };
            return Ok(Self {
                seconds: sign * units,
            });
        }

        let caps = duration_re()
            .captures(trimmed)
            .ok_or_else(|| CycleflowError::MalformedDuration(spec.to_string()))?;

        let mut seconds: i64 = 0;
        let mut matched_any = false;
        for (name, factor) in [
            ("years", SECONDS_PER_YEAR),
            ("months", SECONDS_PER_MONTH),
            ("weeks", SECONDS_PER_WEEK),
            ("days", SECONDS_PER_DAY),
            ("hours", SECONDS_PER_HOUR),
            ("minutes", SECONDS_PER_MINUTE),
            ("seconds", 1),
        ] {
            if let Some(m) = caps.name(name) {
                let n: i64 = m
                    .as_str()
                    .parse()
                    .map_err(|_| CycleflowError::MalformedDuration(spec.to_string()))?;
                // Out-of-range magnitudes are malformed, not wrapped.
                seconds = n
                    .checked_mul(factor)
                    .and_then(|part| seconds.checked_add(part))
                    .ok_or_else(|| CycleflowError::MalformedDuration(spec.to_string()))?;
                matched_any = true;
            }
        }

        if !matched_any {
            return Err(CycleflowError::MalformedDuration(spec.to_string()));
        }

        if caps.name("sign").is_some_and(|s| s.as_str() == "-") {
            seconds = -seconds;
        }

        Ok(Self { seconds })
    }

    pub fn from_seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    pub fn as_seconds(&self) -> i64 {
        self.seconds
    }

    pub fn is_positive(&self) -> bool {
        self.seconds > 0
    }

    /// The interval pointing the other way, as used when inverting a
    /// trigger offset into a graph-child offset.
    pub fn negated(&self) -> Self {
        Self {
            seconds: -self.seconds,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.seconds < 0 {
            write!(f, "-PT{}S", -self.seconds)
        } else {
            write!(f, "PT{}S", self.seconds)
        }
    }
}

fn duration_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?x)^
            (?P<sign>[-+])?P
            (?:(?P<years>\d+)Y)?
            (?:(?P<months>\d+)M)?
            (?:(?P<weeks>\d+)W)?
            (?:(?P<days>\d+)D)?
            (?:T
                (?:(?P<hours>\d+)H)?
                (?:(?P<minutes>\d+)M)?
                (?:(?P<seconds>\d+)S)?
            )?
            $",
        )
        .expect("duration pattern is valid")
    })
}

fn integer_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([-+]?)P(\d+)$").expect("integer pattern is valid"))
}
