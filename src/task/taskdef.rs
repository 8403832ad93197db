// src/task/taskdef.rs

//! Immutable per-workflow-version task definitions.
//!
//! One `TaskDef` per task name, built by `config::compile` when the
//! workflow definition loads and shared read-only (via `Arc`) by every
//! instance of that name. All task "modifiers" (clock offsets, retry
//! policy, family membership) are plain fields inspected by shared logic;
//! there are no per-type behavioural classes.

use std::collections::BTreeMap;

use crate::cycling::{Interval, RecurrenceSequence};
use crate::types::TaskName;

/// One upstream condition template: `task[offset]:message`.
///
/// Resolved against a concrete cycle point when an instance is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerTemplate {
    pub task: TaskName,
    /// Cycle offset of the upstream occurrence relative to the instance's
    /// own point (usually zero or negative).
    pub offset: Option<Interval>,
    pub message: String,
}

/// One downstream spawn template: on completion of an output message,
/// spawn `name` at `point + offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildTemplate {
    pub name: TaskName,
    pub offset: Option<Interval>,
}

/// Static, shared description of a recurring task.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDef {
    pub name: TaskName,
    /// Recurrence sequences, in definition order.
    pub sequences: Vec<RecurrenceSequence>,
    /// Ancestor names for family matching, nearest first.
    pub namespace_hierarchy: Vec<TaskName>,
    pub clocktrigger_offset: Option<Interval>,
    pub late_offset: Option<Interval>,
    pub expire_offset: Option<Interval>,
    /// Execution retry schedule; empty means no automatic retries.
    pub execution_retry_delays: Vec<Interval>,
    /// Submission retry schedule; empty means no automatic retries.
    pub submission_retry_delays: Vec<Interval>,
    /// Upstream condition templates for every instance of this task.
    pub prerequisites: Vec<TriggerTemplate>,
    /// Custom output messages beyond the standard job-lifecycle set.
    pub custom_outputs: Vec<String>,
    /// Old-style external trigger names, satisfied by the control surface.
    pub external_triggers: Vec<String>,
    /// Externally-evaluated condition names (function results are cached
    /// per cycle on the instance, not re-evaluated after success).
    pub xtriggers: Vec<String>,
    /// Output message -> downstream spawn templates, derived from the
    /// workflow graph at definition-load time.
    pub graph_children: BTreeMap<String, Vec<ChildTemplate>>,
    /// Member task names when this definition is a family aggregate;
    /// empty for ordinary tasks.
    pub family_members: Vec<TaskName>,
}

impl TaskDef {
    /// Whether this definition is a family aggregate over member tasks.
    pub fn is_family(&self) -> bool {
        !self.family_members.is_empty()
    }
}
