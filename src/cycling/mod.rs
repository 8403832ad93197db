// src/cycling/mod.rs

//! Cycle-point time arithmetic: point parsing and rendering, epoch
//! conversion, duration parsing and recurrence sequences.

pub mod interval;
pub mod point;
pub mod sequence;

pub use interval::Interval;
pub use point::{CyclePoint, TimeZoneOffset};
pub use sequence::RecurrenceSequence;
