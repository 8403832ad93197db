// src/cycling/sequence.rs

//! Recurrence sequences: the points at which a task definition recurs.

use crate::cycling::interval::Interval;
use crate::cycling::point::CyclePoint;

/// An arithmetic recurrence: `start`, `start + interval`, `start + 2 *
/// interval`, ... up to an optional inclusive `end` bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSequence {
    start: CyclePoint,
    interval: Interval,
    end: Option<CyclePoint>,
}

impl RecurrenceSequence {
    /// The interval must be positive; `config::compile` enforces that
    /// before any sequence is built.
    pub fn new(start: CyclePoint, interval: Interval, end: Option<CyclePoint>) -> Self {
        Self {
            start,
            interval,
            end,
        }
    }

    pub fn start(&self) -> &CyclePoint {
        &self.start
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn end(&self) -> Option<&CyclePoint> {
        self.end.as_ref()
    }

    /// The first sequence point strictly after `point`, or `None` when the
    /// sequence is exhausted (end bound reached) or `point` belongs to a
    /// different cycling family.
    pub fn next_point_after(&self, point: &CyclePoint) -> Option<CyclePoint> {
        let step = self.interval.as_seconds();
        if step <= 0 {
            return None;
        }

        // Bails on cross-family points before any ordering comparison.
        let elapsed = point.seconds_since(&self.start)?;
        let candidate = if elapsed < 0 {
            self.start.clone()
        } else {
            let k = elapsed.div_euclid(step) + 1;
            self.start.add(&Interval::from_seconds(k * step))
        };

        match &self.end {
            Some(end) if candidate > *end => None,
            _ => Some(candidate),
        }
    }

    /// Whether `point` is one of the points generated by this sequence.
    pub fn contains(&self, point: &CyclePoint) -> bool {
        let step = self.interval.as_seconds();
        if step <= 0 {
            return false;
        }
        let Some(elapsed) = point.seconds_since(&self.start) else {
            return false;
        };
        if elapsed < 0 || elapsed % step != 0 {
            return false;
        }
        match &self.end {
            Some(end) => point <= end,
            None => true,
        }
    }
}
