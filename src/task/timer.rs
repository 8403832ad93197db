// src/task/timer.rs

//! Retry/timeout timers: reusable countdown state for submission retries,
//! execution retries and job-status polling backoff.

use crate::types::UnixSeconds;

/// Which retry schedule a timer tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKind {
    ExecutionRetry,
    SubmissionRetry,
}

/// A named countdown: attempts made so far, an ordered delay schedule
/// (final entry repeating once exhausted) and an optional absolute
/// deadline. Expiry is detected by polling against the ambient clock at
/// evaluation time; no timer thread exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionTimer {
    delays: Vec<i64>,
    num: u32,
    timeout: Option<UnixSeconds>,
}

impl TaskActionTimer {
    /// `delays` in seconds, in schedule order.
    pub fn new(delays: Vec<i64>) -> Self {
        Self {
            delays,
            num: 0,
            timeout: None,
        }
    }

    /// Number of attempts consumed so far.
    pub fn num(&self) -> u32 {
        self.num
    }

    pub fn timeout(&self) -> Option<UnixSeconds> {
        self.timeout
    }

    /// True iff no deadline is pending, or the deadline has passed.
    pub fn is_delay_done(&self, now: UnixSeconds) -> bool {
        match self.timeout {
            None => true,
            Some(deadline) => now >= deadline,
        }
    }

    /// Advance to the next attempt: consume the next schedule entry (or
    /// repeat the final one) and set deadline = now + delay. Returns the
    /// delay used.
    pub fn next(&mut self, now: UnixSeconds) -> i64 {
        let delay = self
            .delays
            .get(self.num as usize)
            .or_else(|| self.delays.last())
            .copied()
            .unwrap_or(0);
        self.timeout = Some(now + delay);
        self.num += 1;
        delay
    }

    /// Clear the pending deadline without discarding the attempt counter.
    pub fn reset_timeout(&mut self) {
        self.timeout = None;
    }
}
