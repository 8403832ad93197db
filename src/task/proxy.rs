// src/task/proxy.rs

//! Task proxies: one occurrence of a task definition at one cycle point,
//! carrying all mutable runtime state, plus the readiness evaluator that
//! folds prerequisites, triggers, clock gates, manual overrides, hold
//! state and retry timers into a single run/no-run decision.

use std::collections::BTreeMap;
use std::sync::Arc;

use globset::Glob;
use tracing::{debug, warn};

use crate::cycling::{CyclePoint, TimeZoneOffset};
use crate::graph::{GraphChildren, generate_graph_children};
use crate::task::outputs::{
    OUTPUT_FAILED, OUTPUT_FINISHED, OUTPUT_STARTED, OUTPUT_SUBMIT_FAILED, OUTPUT_SUBMITTED,
    OUTPUT_SUCCEEDED,
};
use crate::task::state::{TaskState, TaskStatus};
use crate::task::taskdef::TaskDef;
use crate::task::timer::{TaskActionTimer, TimerKind};
use crate::types::{JobEvent, Platform, UnixSeconds};

/// Sentinel late time meaning "never late".
pub const NEVER_LATE: UnixSeconds = 0;

/// Outcome of one readiness evaluation, carrying the diagnostic clause
/// values so a caller can report which condition blocks an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// Manually triggered; all prerequisite checks bypassed.
    ManualOverride,
    /// Held tasks are never ready.
    Held,
    /// A retry timer is active for the current status; its delay alone
    /// decides.
    RetryPending { delay_done: bool },
    /// The normal gate: every clause must hold.
    Conditions {
        is_waiting: bool,
        clock_done: bool,
        prereqs_done: bool,
    },
}

impl Readiness {
    /// Fold the diagnostics to the run/no-run decision.
    pub fn is_ready(&self) -> bool {
        match self {
            Readiness::ManualOverride => true,
            Readiness::Held => false,
            Readiness::RetryPending { delay_done } => *delay_done,
            Readiness::Conditions {
                is_waiting,
                clock_done,
                prereqs_done,
            } => *is_waiting && *clock_done && *prereqs_done,
        }
    }
}

/// Summary of the latest job's history: event timestamps, runner
/// identifiers and per-submit platform record. This is display/UI
/// material, stamped by job-event ingestion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskSummary {
    pub submitted_time: Option<UnixSeconds>,
    pub started_time: Option<UnixSeconds>,
    pub finished_time: Option<UnixSeconds>,
    pub job_runner_name: Option<String>,
    pub submit_method_id: Option<String>,
    pub execution_time_limit: Option<i64>,
    /// Platform name by submit number.
    pub platforms_used: BTreeMap<u32, String>,
    pub logfiles: Vec<String>,
}

/// One occurrence of a cycling task in a running workflow.
///
/// Uniquely identified by `(name, cycle_point)`, rendered as
/// `name.point`. Owns its timers and prerequisite records; holds a
/// shared read-only reference to its definition. Single-writer: only the
/// owning scheduler mutates an instance, in response to external events.
#[derive(Debug, Clone)]
pub struct TaskProxy {
    pub tdef: Arc<TaskDef>,
    pub point: CyclePoint,
    /// `name.point`.
    pub identity: String,
    pub state: TaskState,
    /// Monotonic count of job-submission attempts.
    pub submit_num: u32,
    /// Job ids associated with this instance.
    pub jobs: Vec<String>,
    /// Which flow (lineage of a triggering event) this occurrence
    /// belongs to.
    pub flow_label: Option<String>,
    /// Whether completion should spawn further occurrences.
    pub reflow: bool,
    pub platform: Platform,
    pub is_late: bool,
    pub is_manual_submit: bool,
    pub job_vacated: bool,
    pub waiting_on_job_prep: bool,
    pub local_job_file_path: Option<String>,
    pub summary: TaskSummary,
    /// Event-name -> count; an absent key means zero. Mutated only by
    /// the event-ingestion path.
    pub non_unique_events: BTreeMap<String, u64>,
    pub try_timers: BTreeMap<TimerKind, TaskActionTimer>,
    /// Schedule for polling submitted or running jobs.
    pub poll_timer: Option<TaskActionTimer>,
    /// Timeout for the latest job submission/execution.
    pub timeout: Option<UnixSeconds>,
    /// Identity of the replacement instance created on workflow reload.
    /// A one-shot lookup key, never a back pointer; set at most once.
    pub reload_successor: Option<String>,
    /// Output message -> downstream `(name, point)` pairs; derived once
    /// at construction, read-only thereafter.
    pub graph_children: GraphChildren,

    // Memoized wallclock gates: computed lazily once, never recomputed.
    point_as_seconds: Option<UnixSeconds>,
    clock_trigger_time: Option<UnixSeconds>,
    late_time: Option<UnixSeconds>,
    expire_time: Option<UnixSeconds>,
    /// Local UTC offset, fixed at construction.
    tz: TimeZoneOffset,
}

impl TaskProxy {
    pub fn new(
        tdef: Arc<TaskDef>,
        point: CyclePoint,
        flow_label: Option<String>,
        platform: Platform,
        tz: TimeZoneOffset,
    ) -> Self {
        let identity = format!("{}.{}", tdef.name, point);
        let state = TaskState::new(&tdef, &point, TaskStatus::Waiting, false);
        let graph_children = generate_graph_children(&tdef, &point);

        debug!(task = %identity, "constructed task proxy");

        Self {
            point,
            identity,
            state,
            submit_num: 0,
            jobs: Vec::new(),
            flow_label,
            reflow: true,
            platform,
            is_late: false,
            is_manual_submit: false,
            job_vacated: false,
            waiting_on_job_prep: true,
            local_job_file_path: None,
            summary: TaskSummary::default(),
            non_unique_events: BTreeMap::new(),
            try_timers: BTreeMap::new(),
            poll_timer: None,
            timeout: None,
            reload_successor: None,
            graph_children,
            point_as_seconds: None,
            clock_trigger_time: None,
            late_time: None,
            expire_time: None,
            tz,
            tdef,
        }
    }

    pub fn name(&self) -> &str {
        &self.tdef.name
    }

    /// Is this task ready to run?
    ///
    /// Evaluated fresh on every scheduling pass, in strict order: manual
    /// trigger overrides everything; held is never ready; an active retry
    /// timer for the current status gates on its delay alone; otherwise
    /// the waiting/clock/prerequisite clauses must all hold.
    pub fn is_ready_to_run(&mut self, now: UnixSeconds) -> Readiness {
        if self.is_manual_submit {
            // Manually triggered; ignore unsatisfied prerequisites.
            return Readiness::ManualOverride;
        }
        if self.state.is_held {
            return Readiness::Held;
        }
        if let Some(kind) = self.state.status.retry_kind() {
            if let Some(timer) = self.try_timers.get(&kind) {
                return Readiness::RetryPending {
                    delay_done: timer.is_delay_done(now),
                };
            }
        }
        Readiness::Conditions {
            is_waiting: self.state.status == TaskStatus::Waiting,
            clock_done: self.is_waiting_clock_done(now),
            prereqs_done: self.is_waiting_prereqs_done(),
        }
    }

    /// Is this task done waiting for its clock trigger time?
    ///
    /// True immediately when the definition has no clock-trigger offset.
    /// The trigger instant is computed once and cached; it is never
    /// recomputed after being set.
    pub fn is_waiting_clock_done(&mut self, now: UnixSeconds) -> bool {
        let Some(offset) = self.tdef.clocktrigger_offset else {
            return true;
        };
        if self.clock_trigger_time.is_none() {
            self.clock_trigger_time = Some(self.get_point_as_seconds() + offset.as_seconds());
        }
        // The cache was just filled above; absent only if that write failed.
        self.clock_trigger_time.is_some_and(|t| now >= t)
    }

    /// Are ALL prerequisites satisfied: task prerequisites, external
    /// triggers and externally-evaluated conditions?
    pub fn is_waiting_prereqs_done(&self) -> bool {
        self.state.all_task_prereqs_satisfied()
            && self.state.external_triggers_all_satisfied()
            && self.state.xtriggers_all_satisfied()
    }

    /// Are some task prerequisites not satisfied?
    pub fn is_task_prereqs_not_done(&self) -> bool {
        !self.state.all_task_prereqs_satisfied()
    }

    /// My cycle point as seconds since epoch, computed once and cached.
    pub fn get_point_as_seconds(&mut self) -> UnixSeconds {
        if let Some(seconds) = self.point_as_seconds {
            return seconds;
        }
        let seconds = self.point.to_seconds(self.tz);
        self.point_as_seconds = Some(seconds);
        seconds
    }

    /// Lateness threshold in seconds since epoch, computed once. The
    /// [`NEVER_LATE`] sentinel means no late offset is configured; the
    /// external event layer compares wallclock to this value.
    pub fn get_late_time(&mut self) -> UnixSeconds {
        if let Some(t) = self.late_time {
            return t;
        }
        let t = match self.tdef.late_offset {
            Some(offset) => self.get_point_as_seconds() + offset.as_seconds(),
            None => NEVER_LATE,
        };
        self.late_time = Some(t);
        t
    }

    /// Expiry threshold, same caching contract as [`Self::get_late_time`].
    pub fn get_expire_time(&mut self) -> Option<UnixSeconds> {
        if self.expire_time.is_none() {
            self.expire_time = self
                .tdef
                .expire_offset
                .map(|offset| self.get_point_as_seconds() + offset.as_seconds());
        }
        self.expire_time
    }

    /// The automatic-retry attempt count for execution failures, plus
    /// one; zero when no execution-retry timer exists.
    pub fn get_try_num(&self) -> u32 {
        match self.try_timers.get(&TimerKind::ExecutionRetry) {
            Some(timer) => timer.num() + 1,
            None => 0,
        }
    }

    /// Clear the pending deadline on every retry timer without discarding
    /// attempt counters. Used when an instance's state is forcibly
    /// reconciled, e.g. after a manual retrigger.
    pub fn reset_try_timers(&mut self) {
        for timer in self.try_timers.values_mut() {
            timer.reset_timeout();
        }
    }

    /// The next cycle point: the minimum over all of the definition's
    /// sequences of the next point strictly after mine. Exhausted
    /// sequences are silently skipped; `None` when every sequence is
    /// exhausted.
    pub fn next_point(&self) -> Option<CyclePoint> {
        self.tdef
            .sequences
            .iter()
            .filter_map(|seq| seq.next_point_after(&self.point))
            .min()
    }

    /// Copy runtime state to the successor instance created by a workflow
    /// reload, and record the one-shot successor link. The link is never
    /// reassigned; a second call warns and leaves everything untouched.
    pub fn copy_to_reload_successor(&mut self, successor: &mut TaskProxy) {
        if self.reload_successor.is_some() {
            warn!(
                task = %self.identity,
                "reload successor already recorded; ignoring repeat hand-off"
            );
            return;
        }
        self.reload_successor = Some(successor.identity.clone());

        successor.submit_num = self.submit_num;
        successor.is_manual_submit = self.is_manual_submit;
        successor.summary = self.summary.clone();
        successor.local_job_file_path = self.local_job_file_path.clone();
        successor.try_timers = self.try_timers.clone();
        successor.platform = self.platform.clone();
        successor.job_vacated = self.job_vacated;
        successor.poll_timer = self.poll_timer.clone();
        successor.timeout = self.timeout;
        successor.state.outputs = self.state.outputs.clone();
        successor.state.is_held = self.state.is_held;
        successor.state.is_runahead = self.state.is_runahead;
        successor.state.is_updated = self.state.is_updated;
        successor.state.prerequisites = self.state.prerequisites.clone();

        debug!(
            predecessor = %self.identity,
            successor = %successor.identity,
            "copied state to reload successor"
        );
    }

    /// Ingest a job-lifecycle event from the external job-management
    /// layer: advance status, complete the matching output, stamp the
    /// summary, and arm the matching retry timer on failures when the
    /// definition configures retries.
    pub fn record_job_event(&mut self, event: JobEvent, now: UnixSeconds) {
        debug!(task = %self.identity, ?event, "job event");
        match event {
            JobEvent::Submitted => {
                self.submit_num += 1;
                self.is_manual_submit = false;
                self.waiting_on_job_prep = false;
                self.state.status = TaskStatus::Submitted;
                self.state.outputs.complete(OUTPUT_SUBMITTED);
                self.summary.submitted_time = Some(now);
                self.summary
                    .platforms_used
                    .insert(self.submit_num, self.platform.name.clone());
            }
            JobEvent::Started => {
                self.state.status = TaskStatus::Running;
                self.state.outputs.complete(OUTPUT_STARTED);
                self.summary.started_time = Some(now);
            }
            JobEvent::Succeeded => {
                self.state.status = TaskStatus::Succeeded;
                self.state.outputs.complete(OUTPUT_SUCCEEDED);
                self.state.outputs.complete(OUTPUT_FINISHED);
                self.summary.finished_time = Some(now);
            }
            JobEvent::Failed => {
                self.state.status = TaskStatus::Failed;
                self.state.outputs.complete(OUTPUT_FAILED);
                self.state.outputs.complete(OUTPUT_FINISHED);
                self.summary.finished_time = Some(now);
                self.arm_retry_timer(TimerKind::ExecutionRetry, now);
            }
            JobEvent::SubmitFailed => {
                self.state.status = TaskStatus::SubmitFailed;
                self.state.outputs.complete(OUTPUT_SUBMIT_FAILED);
                self.arm_retry_timer(TimerKind::SubmissionRetry, now);
            }
        }
        self.state.is_updated = true;
    }

    fn arm_retry_timer(&mut self, kind: TimerKind, now: UnixSeconds) {
        let delays: Vec<i64> = match kind {
            TimerKind::ExecutionRetry => &self.tdef.execution_retry_delays,
            TimerKind::SubmissionRetry => &self.tdef.submission_retry_delays,
        }
        .iter()
        .map(|d| d.as_seconds())
        .collect();

        if delays.is_empty() {
            return;
        }

        let timer = self
            .try_timers
            .entry(kind)
            .or_insert_with(|| TaskActionTimer::new(delays));
        let delay = timer.next(now);
        debug!(
            task = %self.identity,
            ?kind,
            attempt = timer.num(),
            delay,
            "armed retry timer"
        );
    }

    /// Mark one upstream `(task, point, message)` observation against my
    /// prerequisite records. Returns `true` if any record changed.
    /// Satisfaction is monotonic.
    pub fn satisfy_prerequisite(
        &mut self,
        task: &str,
        point: &CyclePoint,
        message: &str,
    ) -> bool {
        let mut changed = false;
        for prereq in &mut self.state.prerequisites {
            if prereq.satisfy(task, point, message) {
                changed = true;
            }
        }
        if changed {
            self.state.is_updated = true;
            debug!(
                task = %self.identity,
                upstream = %format_args!("{task}.{point}"),
                message,
                "prerequisite condition satisfied"
            );
        }
        changed
    }

    /// Satisfy an old-style external trigger by name.
    pub fn satisfy_external_trigger(&mut self, name: &str) -> bool {
        match self.state.external_triggers.get_mut(name) {
            Some(flag) if !*flag => {
                *flag = true;
                self.state.is_updated = true;
                true
            }
            _ => false,
        }
    }

    /// Cache a satisfied externally-evaluated condition result. Results
    /// are never re-evaluated after success.
    pub fn satisfy_xtrigger(&mut self, name: &str) -> bool {
        match self.state.xtriggers.get_mut(name) {
            Some(flag) if !*flag => {
                *flag = true;
                self.state.is_updated = true;
                true
            }
            _ => false,
        }
    }

    /// Complete one of my own (custom) output messages directly, e.g. on
    /// a message event from the job.
    pub fn complete_output(&mut self, message: &str) -> bool {
        let changed = self.state.outputs.complete(message);
        if changed {
            self.state.is_updated = true;
        }
        changed
    }

    /// Count a non-unique event (critical, warning, custom...). An
    /// absent key means zero.
    pub fn record_non_unique_event(&mut self, name: &str) {
        *self.non_unique_events.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Return whether a string/glob matches my cycle point. A pattern
    /// that parses as a point is standardised and compared by value, so
    /// any layout of the same instant matches; otherwise it is treated as
    /// a glob over my point's rendering. An absent pattern matches
    /// everything; malformed globs fail the match rather than raising.
    pub fn point_match(&self, pattern: Option<&str>) -> bool {
        let Some(pattern) = pattern else {
            return true;
        };
        // The pattern may be a glob, so a parse failure is tolerated.
        match CyclePoint::parse(pattern) {
            Ok(point) => point == self.point,
            Err(_) => glob_match(pattern, &self.point.to_string()),
        }
    }

    /// Return whether a string matches my status exactly. Absent or
    /// empty patterns match everything.
    pub fn status_match(&self, pattern: Option<&str>) -> bool {
        match pattern {
            None => true,
            Some(p) if p.is_empty() => true,
            Some(p) => p == self.state.status.as_str(),
        }
    }

    /// Return whether a string/glob matches my name or any ancestor in
    /// my namespace hierarchy, so family-qualified queries match members.
    pub fn name_match(&self, pattern: &str) -> bool {
        if glob_match(pattern, &self.tdef.name) {
            return true;
        }
        self.tdef
            .namespace_hierarchy
            .iter()
            .any(|ns| glob_match(pattern, ns))
    }
}

impl std::fmt::Display for TaskProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identity)
    }
}

/// Glob match with fail-closed semantics: a malformed pattern is a
/// non-match, never an error.
fn glob_match(pattern: &str, candidate: &str) -> bool {
    match Glob::new(pattern) {
        Ok(glob) => glob.compile_matcher().is_match(candidate),
        Err(_) => false,
    }
}
